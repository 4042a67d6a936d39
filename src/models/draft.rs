//! Transfer draft: the in-progress form data

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::account::Account;
use crate::utils::errors::WizardError;

pub const SUPPORTED_CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "INR", "JPY"];
pub const REMARKS_MAX_CHARS: usize = 200;
pub const OTP_LENGTH: usize = 6;

/// When the transfer should be executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferType {
    #[default]
    Immediate,
    Scheduled,
    Recurring,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Immediate => "immediate",
            TransferType::Scheduled => "scheduled",
            TransferType::Recurring => "recurring",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Ok(TransferType::Immediate),
            "scheduled" => Ok(TransferType::Scheduled),
            "recurring" => Ok(TransferType::Recurring),
            other => Err(format!(
                "'{}' is not a transfer type (immediate, scheduled, recurring)",
                other
            )),
        }
    }
}

/// How often a recurring transfer repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurringFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringFrequency::Daily => "daily",
            RecurringFrequency::Weekly => "weekly",
            RecurringFrequency::Biweekly => "biweekly",
            RecurringFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurringFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurringFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "daily" => Ok(RecurringFrequency::Daily),
            "weekly" => Ok(RecurringFrequency::Weekly),
            "biweekly" => Ok(RecurringFrequency::Biweekly),
            "monthly" => Ok(RecurringFrequency::Monthly),
            other => Err(format!(
                "'{}' is not a frequency (daily, weekly, biweekly, monthly)",
                other
            )),
        }
    }
}

/// Names of the editable draft fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    FromAccount,
    ToAccountNumber,
    RecipientName,
    BankName,
    IfscCode,
    SaveRecipient,
    Amount,
    Currency,
    Remarks,
    TransferType,
    ScheduledDate,
    ScheduledTime,
    RecurringFrequency,
    OtpCode,
}

impl DraftField {
    pub const ALL: [DraftField; 14] = [
        DraftField::FromAccount,
        DraftField::ToAccountNumber,
        DraftField::RecipientName,
        DraftField::BankName,
        DraftField::IfscCode,
        DraftField::SaveRecipient,
        DraftField::Amount,
        DraftField::Currency,
        DraftField::Remarks,
        DraftField::TransferType,
        DraftField::ScheduledDate,
        DraftField::ScheduledTime,
        DraftField::RecurringFrequency,
        DraftField::OtpCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::FromAccount => "fromAccount",
            DraftField::ToAccountNumber => "toAccountNumber",
            DraftField::RecipientName => "recipientName",
            DraftField::BankName => "bankName",
            DraftField::IfscCode => "ifscCode",
            DraftField::SaveRecipient => "saveRecipient",
            DraftField::Amount => "amount",
            DraftField::Currency => "currency",
            DraftField::Remarks => "remarks",
            DraftField::TransferType => "transferType",
            DraftField::ScheduledDate => "scheduledDate",
            DraftField::ScheduledTime => "scheduledTime",
            DraftField::RecurringFrequency => "recurringFrequency",
            DraftField::OtpCode => "otpCode",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = WizardError;

    /// Accepts `toAccountNumber`, `to_account_number`, `to-account-number`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        DraftField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().to_lowercase() == wanted)
            .ok_or_else(|| WizardError::UnknownField(s.to_string()))
    }
}

/// Mutable working record for one transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub from_account: Option<Arc<Account>>,
    pub to_account_number: String,
    pub recipient_name: String,
    pub bank_name: String,
    pub ifsc_code: String,
    pub save_recipient: bool,
    pub amount: String,
    pub currency: String,
    pub remarks: String,
    pub transfer_type: TransferType,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub otp_code: String,
}

impl Default for TransferDraft {
    fn default() -> Self {
        TransferDraft {
            from_account: None,
            to_account_number: String::new(),
            recipient_name: String::new(),
            bank_name: String::new(),
            ifsc_code: String::new(),
            save_recipient: false,
            amount: String::new(),
            currency: "USD".to_string(),
            remarks: String::new(),
            transfer_type: TransferType::Immediate,
            scheduled_date: String::new(),
            scheduled_time: String::new(),
            recurring_frequency: None,
            otp_code: String::new(),
        }
    }
}

impl TransferDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh draft for the next transfer, keeping the source account and currency
    pub fn carry_over(&self) -> Self {
        TransferDraft {
            from_account: self.from_account.clone(),
            currency: self.currency.clone(),
            ..Self::default()
        }
    }

    pub fn set_account(&mut self, account: Option<Arc<Account>>) {
        self.from_account = account;
    }

    /// Apply raw user input to a field. `fromAccount` is resolved by the wizard
    /// against its account list and is rejected here.
    pub fn apply(&mut self, field: DraftField, value: &str) -> Result<(), WizardError> {
        let invalid = |reason: String| WizardError::InvalidValue {
            field: field.to_string(),
            reason,
        };

        match field {
            DraftField::FromAccount => {
                return Err(invalid("accounts are selected by id".to_string()));
            }
            DraftField::ToAccountNumber => self.to_account_number = value.to_string(),
            DraftField::RecipientName => self.recipient_name = value.to_string(),
            DraftField::BankName => self.bank_name = value.to_string(),
            DraftField::IfscCode => self.ifsc_code = value.to_string(),
            DraftField::SaveRecipient => {
                self.save_recipient = parse_flag(value).ok_or_else(|| {
                    invalid(format!("'{}' is not yes/no", value.trim()))
                })?;
            }
            DraftField::Amount => self.amount = value.trim().to_string(),
            DraftField::Currency => {
                let code = value.trim().to_uppercase();
                if !SUPPORTED_CURRENCIES.contains(&code.as_str()) {
                    return Err(invalid(format!(
                        "supported currencies are {}",
                        SUPPORTED_CURRENCIES.join(", ")
                    )));
                }
                self.currency = code;
            }
            DraftField::Remarks => {
                self.remarks = value.chars().take(REMARKS_MAX_CHARS).collect();
            }
            DraftField::TransferType => {
                self.transfer_type = value.parse().map_err(invalid)?;
            }
            DraftField::ScheduledDate => self.scheduled_date = value.trim().to_string(),
            DraftField::ScheduledTime => self.scheduled_time = value.trim().to_string(),
            DraftField::RecurringFrequency => {
                self.recurring_frequency = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(invalid)?)
                };
            }
            DraftField::OtpCode => {
                self.otp_code = value
                    .chars()
                    .filter(|c| c.is_ascii_digit())
                    .take(OTP_LENGTH)
                    .collect();
            }
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "on" | "1" => Some(true),
        "no" | "n" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::mock_accounts;

    #[test]
    fn test_field_names_accept_both_cases() {
        assert_eq!("toAccountNumber".parse::<DraftField>(), Ok(DraftField::ToAccountNumber));
        assert_eq!("to_account_number".parse::<DraftField>(), Ok(DraftField::ToAccountNumber));
        assert_eq!("OTP-CODE".parse::<DraftField>(), Ok(DraftField::OtpCode));
        assert!(matches!(
            "nickname".parse::<DraftField>(),
            Err(WizardError::UnknownField(_))
        ));
    }

    #[test]
    fn test_otp_input_keeps_six_digits() {
        let mut draft = TransferDraft::new();
        draft.apply(DraftField::OtpCode, "12a-34 5678").unwrap();
        assert_eq!(draft.otp_code, "123456");
    }

    #[test]
    fn test_remarks_truncated() {
        let mut draft = TransferDraft::new();
        draft.apply(DraftField::Remarks, &"é".repeat(250)).unwrap();
        assert_eq!(draft.remarks.chars().count(), REMARKS_MAX_CHARS);
    }

    #[test]
    fn test_rejected_input_leaves_draft_unchanged() {
        let mut draft = TransferDraft::new();
        assert!(draft.apply(DraftField::Currency, "XYZ").is_err());
        assert!(draft.apply(DraftField::TransferType, "someday").is_err());
        assert!(draft.apply(DraftField::SaveRecipient, "maybe").is_err());
        assert_eq!(draft, TransferDraft::new());

        draft.apply(DraftField::Currency, "eur").unwrap();
        assert_eq!(draft.currency, "EUR");
    }

    #[test]
    fn test_frequency_can_be_cleared() {
        let mut draft = TransferDraft::new();
        draft.apply(DraftField::RecurringFrequency, "Bi-weekly").unwrap();
        assert_eq!(draft.recurring_frequency, Some(RecurringFrequency::Biweekly));
        draft.apply(DraftField::RecurringFrequency, "").unwrap();
        assert_eq!(draft.recurring_frequency, None);
    }

    #[test]
    fn test_carry_over_keeps_account_and_currency() {
        let accounts = mock_accounts();
        let mut draft = TransferDraft::new();
        draft.set_account(Some(accounts[0].clone()));
        draft.apply(DraftField::Currency, "GBP").unwrap();
        draft.apply(DraftField::Amount, "250").unwrap();
        draft.apply(DraftField::RecipientName, "Jane").unwrap();
        draft.apply(DraftField::TransferType, "recurring").unwrap();

        let next = draft.carry_over();
        assert_eq!(next.from_account, Some(accounts[0].clone()));
        assert_eq!(next.currency, "GBP");
        assert!(next.amount.is_empty());
        assert!(next.recipient_name.is_empty());
        assert_eq!(next.transfer_type, TransferType::Immediate);
    }
}
