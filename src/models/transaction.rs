//! Transaction models

use serde::Serialize;

pub const SUCCESS_MESSAGE: &str = "Transfer completed successfully";
pub const FAILURE_MESSAGE: &str = "Transfer failed. Please try again.";

/// Outcome of one confirmed transfer attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub message: String,
    /// ISO-8601 UTC with milliseconds
    pub timestamp: String,
}
