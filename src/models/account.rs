//! Mock source accounts

use std::sync::Arc;

use lazy_static::lazy_static;
use serde::Serialize;

/// A source account the user can transfer from. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: String,
    pub number: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub balance: f64,
    pub currency: String,
}

impl Account {
    fn new(id: &str, number: &str, account_type: &str, balance: f64, currency: &str) -> Self {
        Account {
            id: id.to_string(),
            number: number.to_string(),
            account_type: account_type.to_string(),
            balance,
            currency: currency.to_string(),
        }
    }

    /// Label used in account pickers, e.g. `Savings - ****1234`
    pub fn label(&self) -> String {
        format!("{} - {}", self.account_type, self.number)
    }
}

lazy_static! {
    static ref MOCK_ACCOUNTS: Vec<Arc<Account>> = vec![
        Arc::new(Account::new("acc1", "****1234", "Savings", 15000.0, "USD")),
        Arc::new(Account::new("acc2", "****5678", "Checking", 8500.0, "USD")),
        Arc::new(Account::new("acc3", "****9012", "Business", 45000.0, "USD")),
    ];
}

/// The fixed set of accounts every wizard offers
pub fn mock_accounts() -> Vec<Arc<Account>> {
    MOCK_ACCOUNTS.clone()
}

/// Find an account by id (case-insensitive)
pub fn find_account(accounts: &[Arc<Account>], id: &str) -> Option<Arc<Account>> {
    accounts
        .iter()
        .find(|acc| acc.id.eq_ignore_ascii_case(id.trim()))
        .cloned()
}
