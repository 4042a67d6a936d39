use thiserror::Error;

use crate::models::{StepKind, ValidationErrors};

/// Errors raised by the transfer wizard state machine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WizardError {
    #[error("Cannot {action} while on the {step} step")]
    InvalidTransition { action: &'static str, step: StepKind },
    #[error("The transfer wizard is not open. Use `$transfer open` first")]
    NotOpen,
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Please fix the following: {0}")]
    Validation(ValidationErrors),
    #[error("No OTP has been sent yet. Use `$transfer otp send`")]
    OtpNotSent,
    #[error("Resend OTP in {0}s")]
    ResendLocked(u64),
    #[error("OTP must be exactly 6 digits")]
    OtpIncomplete,
    #[error("Invalid OTP. Please try again.")]
    OtpRejected,
    #[error("Transfer is still processing")]
    TransferProcessing,
    #[error("A receipt is only available after a successful transfer")]
    ReceiptUnavailable,
    #[error("Failed to build receipt: {0}")]
    Receipt(String),
}

/// Errors raised by the per-user session registry
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("You have no transfer in progress. Use `$transfer open` first")]
    NoSession,
    #[error("The transfer wizard was closed before the operation finished")]
    Superseded,
    #[error("The security step was restarted before the code was checked. Please enter the code again")]
    VerificationInterrupted,
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}
