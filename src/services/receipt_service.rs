use crate::models::{Receipt, TransactionResult, TransferDraft};
use crate::utils::errors::WizardError;

/// Build the receipt for a finished transfer. Failed transfers get none.
pub fn build_receipt(
    result: &TransactionResult,
    draft: &TransferDraft,
) -> Result<Receipt, WizardError> {
    if !result.success {
        return Err(WizardError::ReceiptUnavailable);
    }

    Ok(Receipt {
        transaction_id: result.transaction_id.clone(),
        from: draft.from_account.as_ref().map(|acc| acc.number.clone()),
        to: draft.to_account_number.clone(),
        recipient: draft.recipient_name.clone(),
        amount: draft.amount.clone(),
        currency: draft.currency.clone(),
        date: result.timestamp.clone(),
        status: "Success".to_string(),
    })
}

/// `receipt-<transactionId>.json`
pub fn receipt_file_name(receipt: &Receipt) -> String {
    format!(
        "receipt-{}.json",
        receipt.transaction_id.as_deref().unwrap_or("null")
    )
}

/// Pretty JSON, two-space indent
pub fn receipt_json(receipt: &Receipt) -> Result<String, WizardError> {
    serde_json::to_string_pretty(receipt).map_err(|e| WizardError::Receipt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mock_accounts;
    use crate::services::transfer_service::build_result;
    use chrono::{TimeZone, Utc};

    fn draft() -> TransferDraft {
        let mut draft = TransferDraft::new();
        draft.from_account = Some(mock_accounts()[0].clone());
        draft.to_account_number = "1234567890".to_string();
        draft.recipient_name = "Jane".to_string();
        draft.bank_name = "Bank".to_string();
        draft.amount = "500".to_string();
        draft
    }

    #[test]
    fn test_receipt_for_success() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let result = build_result(true, now);
        let receipt = build_receipt(&result, &draft()).unwrap();

        assert_eq!(receipt.from.as_deref(), Some("****1234"));
        assert_eq!(receipt.status, "Success");
        assert_eq!(
            receipt_file_name(&receipt),
            format!("receipt-{}.json", result.transaction_id.unwrap())
        );

        let json: serde_json::Value =
            serde_json::from_str(&receipt_json(&receipt).unwrap()).unwrap();
        assert_eq!(json["recipient"], "Jane");
        assert_eq!(json["amount"], "500");
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["date"], "2026-10-19T08:30:00.000Z");
        assert!(json["transactionId"].as_str().unwrap().starts_with("TXN"));
    }

    #[test]
    fn test_no_receipt_for_failure() {
        let result = build_result(false, Utc::now());
        assert_eq!(
            build_receipt(&result, &draft()),
            Err(WizardError::ReceiptUnavailable)
        );
    }
}
