//! Downloadable transfer receipt

use serde::Serialize;

/// Structured receipt offered after a successful transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_id: Option<String>,
    pub from: Option<String>,
    pub to: String,
    pub recipient: String,
    pub amount: String,
    pub currency: String,
    pub date: String,
    pub status: String,
}
