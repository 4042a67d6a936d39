use crate::models::{DraftField, TransferDraft, TransferType, ValidationErrors};

const ACCOUNT_NUMBER_MIN_DIGITS: usize = 10;
const ACCOUNT_NUMBER_MAX_DIGITS: usize = 16;

/// Parse a user-entered amount. Only finite numbers count.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Account numbers are 10 to 16 ASCII digits once all whitespace is removed
pub fn is_valid_account_number(raw: &str) -> bool {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    (ACCOUNT_NUMBER_MIN_DIGITS..=ACCOUNT_NUMBER_MAX_DIGITS).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// Check everything the details step collects. An empty result means the
/// wizard may move on.
pub fn validate(draft: &TransferDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.from_account.is_none() {
        errors.insert(DraftField::FromAccount, "Please select a source account");
    }

    if draft.to_account_number.trim().is_empty() {
        errors.insert(DraftField::ToAccountNumber, "Recipient account number is required");
    } else if !is_valid_account_number(&draft.to_account_number) {
        errors.insert(DraftField::ToAccountNumber, "Invalid account number format");
    }

    if draft.recipient_name.trim().is_empty() {
        errors.insert(DraftField::RecipientName, "Recipient name is required");
    }

    if draft.bank_name.trim().is_empty() {
        errors.insert(DraftField::BankName, "Bank name is required");
    }

    match parse_amount(&draft.amount) {
        Some(amount) if amount > 0.0 => {
            if let Some(account) = &draft.from_account {
                if amount > account.balance {
                    errors.insert(DraftField::Amount, "Insufficient balance");
                }
            }
        }
        _ => errors.insert(DraftField::Amount, "Please enter a valid amount"),
    }

    match draft.transfer_type {
        TransferType::Scheduled => {
            if draft.scheduled_date.trim().is_empty() {
                errors.insert(DraftField::ScheduledDate, "Please select a date");
            }
            if draft.scheduled_time.trim().is_empty() {
                errors.insert(DraftField::ScheduledTime, "Please select a time");
            }
        }
        TransferType::Recurring => {
            if draft.recurring_frequency.is_none() {
                errors.insert(DraftField::RecurringFrequency, "Please select frequency");
            }
        }
        TransferType::Immediate => {}
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draft::RecurringFrequency;
    use crate::models::mock_accounts;

    fn valid_draft() -> TransferDraft {
        let mut draft = TransferDraft::new();
        draft.from_account = Some(mock_accounts()[1].clone());
        draft.to_account_number = "1234567890".to_string();
        draft.recipient_name = "Jane".to_string();
        draft.bank_name = "Bank".to_string();
        draft.amount = "500".to_string();
        draft
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn test_empty_draft_flags_every_required_field() {
        let errors = validate(&TransferDraft::new());
        for field in [
            DraftField::FromAccount,
            DraftField::ToAccountNumber,
            DraftField::RecipientName,
            DraftField::BankName,
            DraftField::Amount,
        ] {
            assert!(errors.get(field).is_some(), "{} should be flagged", field);
        }
        assert_eq!(errors.len(), 5);
    }

    fn assert_flagged(field: DraftField, blank: fn(&mut TransferDraft)) {
        let mut draft = valid_draft();
        blank(&mut draft);
        let errors = validate(&draft);
        assert!(errors.get(field).is_some(), "{} should be flagged", field);
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        assert_flagged(DraftField::FromAccount, |d| d.from_account = None);
        assert_flagged(DraftField::ToAccountNumber, |d| d.to_account_number = "   ".to_string());
        assert_flagged(DraftField::RecipientName, |d| d.recipient_name = " ".to_string());
        assert_flagged(DraftField::BankName, |d| d.bank_name.clear());
        assert_flagged(DraftField::Amount, |d| d.amount.clear());
    }

    #[test]
    fn test_amount_over_balance_is_insufficient() {
        let mut draft = valid_draft();
        draft.amount = "8500.01".to_string();
        assert_eq!(validate(&draft).get(DraftField::Amount), Some("Insufficient balance"));

        draft.amount = "8500".to_string();
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_non_positive_or_garbage_amounts() {
        for raw in ["0", "-5", "abc", "NaN", "inf", ""] {
            let mut draft = valid_draft();
            draft.amount = raw.to_string();
            assert_eq!(
                validate(&draft).get(DraftField::Amount),
                Some("Please enter a valid amount"),
                "amount {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_account_number_format() {
        assert!(is_valid_account_number("0000000000"));
        assert!(is_valid_account_number("1234 5678 9012 3456"));
        assert!(is_valid_account_number("\t1234567890\n"));
        assert!(!is_valid_account_number("123456789"));
        assert!(!is_valid_account_number("12345678901234567"));
        assert!(!is_valid_account_number("12345-67890"));
        assert!(!is_valid_account_number("１２３４５６７８９０"));

        let mut draft = valid_draft();
        draft.to_account_number = "12345".to_string();
        assert_eq!(
            validate(&draft).get(DraftField::ToAccountNumber),
            Some("Invalid account number format")
        );
    }

    #[test]
    fn test_scheduled_requires_date_and_time() {
        let mut draft = valid_draft();
        draft.transfer_type = TransferType::Scheduled;
        let errors = validate(&draft);
        assert!(errors.get(DraftField::ScheduledDate).is_some());
        assert!(errors.get(DraftField::ScheduledTime).is_some());

        draft.scheduled_date = "2026-11-01".to_string();
        draft.scheduled_time = "09:30".to_string();
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_recurring_requires_frequency() {
        let mut draft = valid_draft();
        draft.transfer_type = TransferType::Recurring;
        assert_eq!(
            validate(&draft).get(DraftField::RecurringFrequency),
            Some("Please select frequency")
        );

        draft.recurring_frequency = Some(RecurringFrequency::Monthly);
        assert!(validate(&draft).is_empty());
    }
}
