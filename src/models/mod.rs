//! Data models for the transfer wizard
//!
//! Plain data shared by the services and commands: mock accounts, the transfer
//! draft, validation messages, step identifiers and transfer outcomes.

pub mod account;
pub mod draft;
pub mod validation;
pub mod step;
pub mod transaction;
pub mod receipt;

// Re-export commonly used types for convenience
pub use account::{Account, find_account, mock_accounts};
pub use draft::{DraftField, TransferDraft, TransferType};
pub use validation::ValidationErrors;
pub use step::StepKind;
pub use transaction::TransactionResult;
pub use receipt::Receipt;
