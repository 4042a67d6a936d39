use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use std::sync::Arc;

use crate::models::draft::REMARKS_MAX_CHARS;
use crate::models::{Account, DraftField, TransferDraft, TransferType};
use crate::services::otp_service::SENTINEL_OTP;
use crate::services::validation_service;
use crate::services::wizard_service::{Step, TransferWizard};
use crate::utils::table::{Align, Table};

const COLOR_INFO: u32 = 0x00b0f4;
const COLOR_WARN: u32 = 0xffa500;
const COLOR_SUCCESS: u32 = 0x00ff00;
const COLOR_ERROR: u32 = 0xff3333;

/// `15000` -> `15,000.00`
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

pub fn transfer_type_display(draft: &TransferDraft) -> String {
    match draft.transfer_type {
        TransferType::Immediate => "Immediate".to_string(),
        TransferType::Scheduled => format!(
            "Scheduled: {} at {}",
            draft.scheduled_date, draft.scheduled_time
        ),
        TransferType::Recurring => format!(
            "Recurring: {}",
            draft
                .recurring_frequency
                .map(|f| f.to_string())
                .unwrap_or_default()
        ),
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// `value` followed by the field's validation message, if any
fn with_error(wizard: &TransferWizard, field: DraftField, value: String) -> String {
    match wizard.errors().get(field) {
        Some(msg) => format!("{}\n⚠️ {}", value, msg),
        None => value,
    }
}

pub fn accounts_table(accounts: &[Arc<Account>]) -> String {
    let mut table = Table::new(vec!["ID", "Type", "Number", "Balance"]).align(3, Align::Right);
    for acc in accounts {
        let balance = format!("{} {}", acc.currency, format_amount(acc.balance));
        table.add_row(vec![
            acc.id.as_str(),
            acc.account_type.as_str(),
            acc.number.as_str(),
            balance.as_str(),
        ]);
    }
    table.render()
}

/// `$accounts` listing. The table already renders as a code block.
pub fn create_accounts_embed(accounts: &[Arc<Account>]) -> CreateEmbed {
    CreateEmbed::default()
        .title("🏦 Your Accounts")
        .description(accounts_table(accounts))
        .footer(CreateEmbedFooter::new(
            "Use the ID with `$transfer set fromAccount <ID>`",
        ))
        .color(COLOR_INFO)
}

fn details_embed(wizard: &TransferWizard) -> CreateEmbed {
    let draft = wizard.draft();

    let from = match &draft.from_account {
        Some(acc) => format!(
            "{}\nAvailable: {} {}",
            acc.label(),
            acc.currency,
            format_amount(acc.balance)
        ),
        None => "-- Select Account --".to_string(),
    };

    let mut to = format!(
        "{}\n{}\n{}",
        with_error(
            wizard,
            DraftField::ToAccountNumber,
            format!("Account: {}", or_dash(&draft.to_account_number)),
        ),
        with_error(
            wizard,
            DraftField::RecipientName,
            format!("Name: {}", or_dash(&draft.recipient_name)),
        ),
        with_error(
            wizard,
            DraftField::BankName,
            format!("Bank: {}", or_dash(&draft.bank_name)),
        ),
    );
    if !draft.ifsc_code.is_empty() {
        to.push_str(&format!("\nIFSC/Routing: {}", draft.ifsc_code));
    }
    if draft.save_recipient {
        to.push_str("\nSaved for future transfers");
    }

    let mut amount = format!("{} {}", draft.currency, or_dash(&draft.amount));
    if let Some(acc) = &draft.from_account {
        amount.push_str(&format!(
            "\nMaximum available: {} {}",
            draft.currency,
            format_amount(acc.balance)
        ));
    }

    let mut schedule = transfer_type_display(draft);
    for field in [
        DraftField::ScheduledDate,
        DraftField::ScheduledTime,
        DraftField::RecurringFrequency,
    ] {
        if let Some(msg) = wizard.errors().get(field) {
            schedule.push_str(&format!("\n⚠️ {}", msg));
        }
    }

    CreateEmbed::default()
        .title("💸 Transfer Funds")
        .description("Fill in the details with `$transfer set <field> <value>`, then `$transfer continue`.")
        .field("From Account", with_error(wizard, DraftField::FromAccount, from), false)
        .field("To Account", to, false)
        .field("Amount", with_error(wizard, DraftField::Amount, amount), true)
        .field("Transfer Type", schedule, true)
        .field(
            format!("Remarks ({}/{})", draft.remarks.chars().count(), REMARKS_MAX_CHARS),
            or_dash(&draft.remarks).to_string(),
            false,
        )
        .footer(CreateEmbedFooter::new(
            "Fields: fromAccount toAccountNumber recipientName bankName ifscCode saveRecipient amount currency remarks transferType scheduledDate scheduledTime recurringFrequency",
        ))
        .color(if wizard.errors().is_empty() { COLOR_INFO } else { COLOR_WARN })
}

fn security_embed(wizard: &TransferWizard) -> CreateEmbed {
    let Some(challenge) = wizard.otp_challenge() else {
        return CreateEmbed::default().title("🔒 Security Verification").color(COLOR_WARN);
    };

    let mut embed = CreateEmbed::default()
        .title("🔒 Security Verification")
        .description(
            "This transaction requires authentication to ensure security.\n\
             Transaction limit: USD 10,000 per transfer | Daily limit: USD 50,000",
        )
        .color(COLOR_WARN);

    if !challenge.sent {
        embed = embed.field(
            "Send OTP",
            "We'll send a verification code to your registered mobile number/email.\nUse `$transfer otp send`",
            false,
        );
    } else {
        let entered = wizard.draft().otp_code.len();
        let resend = if challenge.can_resend() {
            "Resend with `$transfer otp resend`".to_string()
        } else {
            format!("Resend OTP in {}s", challenge.countdown)
        };
        embed = embed
            .field("Enter OTP Code", format!("`$transfer otp <code>` ({}/6 digits entered)", entered), false)
            .field("Resend", resend, true)
            .field("Hint", format!("Use \"{}\" for testing purposes", SENTINEL_OTP), true);
    }

    if let Some(msg) = challenge.error.as_deref() {
        embed = embed.field("Error", msg, false).color(COLOR_ERROR);
    }
    embed.footer(CreateEmbedFooter::new("`$transfer back` returns to the transfer details"))
}

fn confirmation_embed(wizard: &TransferWizard, processing: bool) -> CreateEmbed {
    let draft = wizard.draft();

    let from = match &draft.from_account {
        Some(acc) => format!(
            "Account Type: {}\nAccount Number: {}\nCurrent Balance: {} {}",
            acc.account_type,
            acc.number,
            draft.currency,
            format_amount(acc.balance)
        ),
        None => "-".to_string(),
    };

    let mut to = format!(
        "Recipient Name: {}\nAccount Number: {}\nBank: {}",
        draft.recipient_name, draft.to_account_number, draft.bank_name
    );
    if !draft.ifsc_code.is_empty() {
        to.push_str(&format!("\nIFSC/Routing: {}", draft.ifsc_code));
    }

    let mut details = match wizard.fee_breakdown() {
        Some(b) => format!(
            "Amount: {cur} {}\nTransfer Fee: {cur} {:.2}\n**Total Amount: {cur} {}**",
            format_amount(b.amount),
            b.fee,
            format_amount(b.total),
            cur = draft.currency
        ),
        None => format!("Amount: {} {}", draft.currency, draft.amount),
    };
    details.push_str(&format!("\nTransfer Type: {}", transfer_type_display(draft)));
    if !draft.remarks.is_empty() {
        details.push_str(&format!("\nRemarks: {}", draft.remarks));
    }

    let actions = if processing {
        "Processing...".to_string()
    } else {
        "`$transfer confirm` | `$transfer edit` | `$transfer cancel`".to_string()
    };

    CreateEmbed::default()
        .title("📝 Review & Confirm Transfer")
        .field("From Account", from, true)
        .field("To Account", to, true)
        .field("Transfer Details", details, false)
        .field(
            "⚠️ Notice",
            "Please review all details carefully. This transaction cannot be undone once confirmed.",
            false,
        )
        .field("Actions", actions, false)
        .color(COLOR_INFO)
}

fn feedback_embed(wizard: &TransferWizard) -> CreateEmbed {
    let draft = wizard.draft();
    let Some(result) = wizard.result() else {
        return CreateEmbed::default().title("Transfer").color(COLOR_WARN);
    };

    if result.success {
        let amount = validation_service::parse_amount(&draft.amount)
            .map(format_amount)
            .unwrap_or_else(|| draft.amount.clone());
        let from = draft
            .from_account
            .as_ref()
            .map(|acc| acc.label())
            .unwrap_or_else(|| "-".to_string());

        CreateEmbed::default()
            .title(format!("✅ {}", result.message))
            .field(
                "Transaction ID",
                format!("`{}`", result.transaction_id.as_deref().unwrap_or("N/A")),
                false,
            )
            .field("Date & Time", &result.timestamp, false)
            .field("From", from, true)
            .field(
                "To",
                format!("{} ({})", draft.recipient_name, draft.to_account_number),
                true,
            )
            .field("Amount", format!("{} {}", draft.currency, amount), true)
            .field("Status", "Completed", true)
            .footer(CreateEmbedFooter::new(
                "$transfer receipt | $transfer new | $transfer close",
            ))
            .color(COLOR_SUCCESS)
    } else {
        CreateEmbed::default()
            .title(format!("❌ {}", result.message))
            .description(format!(
                "Transaction ID: {}\nIf you continue to experience issues, please contact customer support.",
                result.transaction_id.as_deref().unwrap_or("N/A")
            ))
            .footer(CreateEmbedFooter::new("$transfer new | $transfer close"))
            .color(COLOR_ERROR)
    }
}

/// Render whichever step is active
pub fn create_step_embed(wizard: &TransferWizard) -> CreateEmbed {
    match wizard.step() {
        Step::Details => details_embed(wizard),
        Step::Security(_) => security_embed(wizard),
        Step::Confirmation { processing } => confirmation_embed(wizard, *processing),
        Step::Feedback(_) => feedback_embed(wizard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draft::RecurringFrequency;
    use crate::models::mock_accounts;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.5), "999.50");
        assert_eq!(format_amount(15000.0), "15,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-85.5), "-85.50");
    }

    #[test]
    fn test_transfer_type_display() {
        let mut draft = TransferDraft::new();
        assert_eq!(transfer_type_display(&draft), "Immediate");

        draft.transfer_type = TransferType::Scheduled;
        draft.scheduled_date = "2026-11-01".to_string();
        draft.scheduled_time = "09:30".to_string();
        assert_eq!(transfer_type_display(&draft), "Scheduled: 2026-11-01 at 09:30");

        draft.transfer_type = TransferType::Recurring;
        draft.recurring_frequency = Some(RecurringFrequency::Weekly);
        assert_eq!(transfer_type_display(&draft), "Recurring: weekly");
    }

    #[test]
    fn test_accounts_table_lists_every_account() {
        let rendered = accounts_table(&mock_accounts());
        assert!(rendered.contains("acc1"));
        assert!(rendered.contains("Checking"));
        assert!(rendered.contains("USD 45,000.00"));
    }

    #[test]
    fn test_accounts_table_is_a_single_code_block() {
        let rendered = accounts_table(&mock_accounts());
        assert_eq!(rendered.matches("```").count(), 2);
        assert!(rendered.starts_with("```\n"));
        assert!(rendered.ends_with("\n```"));
    }

    #[test]
    fn test_accounts_embed_description_not_double_fenced() {
        let embed = serde_json::to_value(create_accounts_embed(&mock_accounts())).unwrap();
        let description = embed["description"].as_str().unwrap();
        assert_eq!(description.matches("```").count(), 2);
        assert!(description.contains("acc2"));
    }
}
