//! Transfer wizard state machine
//!
//! Four steps, exactly one active at a time:
//!
//! ```text
//! Details --proceed--> Security --verify--> Confirmation --confirm--> Feedback
//!    ^  \______________(2FA off)__________^  |   |                      |
//!    |_________________back__________________|   |                      |
//!    |_________________edit______________________|                      |
//!    |_________________start new transfer_______________________________|
//! ```
//!
//! The wizard is synchronous. Latency and timers live in the session layer,
//! which calls the `begin_*` / `complete_*` pairs around its sleeps.

use std::sync::Arc;

use tracing::debug;

use crate::models::{
    find_account, Account, DraftField, Receipt, StepKind, TransactionResult, TransferDraft,
    ValidationErrors,
};
use crate::services::fee_service::{self, FeeBreakdown};
use crate::services::otp_service::{self, OtpChallenge};
use crate::services::receipt_service;
#[cfg(test)]
use crate::services::transfer_service::{self, OutcomeSource};
use crate::services::validation_service;
use crate::utils::errors::WizardError;

/// Active step and the data that only exists while it is active
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Details,
    Security(OtpChallenge),
    Confirmation { processing: bool },
    Feedback(TransactionResult),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Details => StepKind::Details,
            Step::Security(_) => StepKind::Security,
            Step::Confirmation { .. } => StepKind::Confirmation,
            Step::Feedback(_) => StepKind::Feedback,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransferWizard {
    accounts: Vec<Arc<Account>>,
    two_factor: bool,
    open: bool,
    step: Step,
    draft: TransferDraft,
    errors: ValidationErrors,
}

impl TransferWizard {
    /// A freshly opened wizard on the details step
    pub fn new(accounts: Vec<Arc<Account>>, two_factor: bool) -> Self {
        TransferWizard {
            accounts,
            two_factor,
            open: true,
            step: Step::Details,
            draft: TransferDraft::new(),
            errors: ValidationErrors::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn step_kind(&self) -> StepKind {
        self.step.kind()
    }

    pub fn draft(&self) -> &TransferDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn result(&self) -> Option<&TransactionResult> {
        match &self.step {
            Step::Feedback(result) => Some(result),
            _ => None,
        }
    }

    pub fn otp_challenge(&self) -> Option<&OtpChallenge> {
        match &self.step {
            Step::Security(challenge) => Some(challenge),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.step, Step::Confirmation { processing: true })
    }

    /// Fee breakdown for the current amount, if it parses
    pub fn fee_breakdown(&self) -> Option<FeeBreakdown> {
        validation_service::parse_amount(&self.draft.amount).map(fee_service::breakdown)
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close immediately. Clearing the form is left to [`TransferWizard::reset`],
    /// which the caller runs after its close delay.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Back to an empty details step. Openness is unchanged.
    pub fn reset(&mut self) {
        self.step = Step::Details;
        self.draft = TransferDraft::new();
        self.errors = ValidationErrors::new();
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.open {
            Ok(())
        } else {
            Err(WizardError::NotOpen)
        }
    }

    fn invalid(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            action,
            step: self.step.kind(),
        }
    }

    /// Edit one draft field from raw input. Details fields are editable on the
    /// details step, the OTP code on the security step.
    pub fn update_field(&mut self, field: DraftField, value: &str) -> Result<(), WizardError> {
        self.ensure_open()?;

        match (self.step.kind(), field) {
            (StepKind::Security, DraftField::OtpCode) => {
                self.draft.apply(field, value)?;
                if let Step::Security(challenge) = &mut self.step {
                    challenge.error = None;
                }
            }
            (StepKind::Details, DraftField::OtpCode) | (StepKind::Security, _) => {
                return Err(self.invalid("edit that field"));
            }
            (StepKind::Details, DraftField::FromAccount) => {
                let account = find_account(&self.accounts, value).ok_or_else(|| {
                    WizardError::InvalidValue {
                        field: field.to_string(),
                        reason: format!("no account with id '{}'", value.trim()),
                    }
                })?;
                self.draft.set_account(Some(account));
            }
            (StepKind::Details, _) => self.draft.apply(field, value)?,
            _ => return Err(self.invalid("edit the transfer")),
        }

        self.errors.clear_field(field);
        Ok(())
    }

    /// Validate the details and move on to security or straight to confirmation
    pub fn proceed(&mut self) -> Result<StepKind, WizardError> {
        self.ensure_open()?;
        if !matches!(self.step, Step::Details) {
            return Err(self.invalid("continue"));
        }

        self.errors = validation_service::validate(&self.draft);
        if !self.errors.is_empty() {
            debug!(count = self.errors.len(), "Transfer details rejected: {}", self.errors);
            return Err(WizardError::Validation(self.errors.clone()));
        }

        self.step = if self.two_factor {
            Step::Security(OtpChallenge::default())
        } else {
            Step::Confirmation { processing: false }
        };
        Ok(self.step.kind())
    }

    pub fn send_otp(&mut self, resend_seconds: u64) -> Result<(), WizardError> {
        self.ensure_open()?;
        match &mut self.step {
            Step::Security(challenge) => challenge.send(resend_seconds),
            _ => Err(self.invalid("send an OTP")),
        }
    }

    /// Advance the resend countdown by one second. `None` off the security step.
    pub fn tick_countdown(&mut self) -> Option<u64> {
        match &mut self.step {
            Step::Security(challenge) => Some(challenge.tick()),
            _ => None,
        }
    }

    /// Start verifying the entered code. Returns the code being checked.
    pub fn begin_otp_verification(&mut self) -> Result<String, WizardError> {
        self.ensure_open()?;
        let code = self.draft.otp_code.clone();
        match &mut self.step {
            Step::Security(challenge) => {
                if !challenge.sent {
                    return Err(WizardError::OtpNotSent);
                }
                if challenge.verifying {
                    return Err(WizardError::InvalidTransition {
                        action: "verify again",
                        step: StepKind::Security,
                    });
                }
                if !otp_service::is_complete(&code) {
                    return Err(WizardError::OtpIncomplete);
                }
                challenge.verifying = true;
                challenge.error = None;
                Ok(code)
            }
            _ => Err(self.invalid("verify an OTP")),
        }
    }

    /// Finish verifying `code`. Accepted codes move to confirmation.
    pub fn complete_otp_verification(&mut self, code: &str) -> Result<StepKind, WizardError> {
        self.ensure_open()?;
        let accepted = otp_service::is_acceptable(code);
        match &mut self.step {
            Step::Security(challenge) if challenge.verifying => {
                if !accepted {
                    challenge.verifying = false;
                    challenge.error = Some(WizardError::OtpRejected.to_string());
                    return Err(WizardError::OtpRejected);
                }
            }
            _ => return Err(self.invalid("finish verification")),
        }

        self.step = Step::Confirmation { processing: false };
        Ok(StepKind::Confirmation)
    }

    /// Verify without latency
    #[cfg(test)]
    pub fn verify_otp(&mut self) -> Result<StepKind, WizardError> {
        let code = self.begin_otp_verification()?;
        self.complete_otp_verification(&code)
    }

    /// Security back to details
    pub fn back(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        match self.step {
            Step::Security(_) => {
                self.step = Step::Details;
                Ok(())
            }
            _ => Err(self.invalid("go back")),
        }
    }

    /// Mark the confirmation as processing
    pub fn begin_confirm(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        match self.step {
            Step::Confirmation { processing: false } => {
                self.step = Step::Confirmation { processing: true };
                Ok(())
            }
            Step::Confirmation { processing: true } => Err(WizardError::TransferProcessing),
            _ => Err(self.invalid("confirm")),
        }
    }

    /// Land the outcome of a processing confirmation
    pub fn complete_confirm(&mut self, result: TransactionResult) -> Result<(), WizardError> {
        self.ensure_open()?;
        match self.step {
            Step::Confirmation { processing: true } => {
                self.step = Step::Feedback(result);
                Ok(())
            }
            _ => Err(self.invalid("finish the transfer")),
        }
    }

    /// Confirm without latency
    #[cfg(test)]
    pub fn confirm(&mut self, source: &mut dyn OutcomeSource) -> Result<&TransactionResult, WizardError> {
        self.begin_confirm()?;
        self.complete_confirm(transfer_service::draw_result(source))?;
        self.result().ok_or(WizardError::InvalidTransition {
            action: "confirm",
            step: StepKind::Feedback,
        })
    }

    /// Confirmation back to details, keeping the draft
    pub fn edit(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        match self.step {
            Step::Confirmation { processing: false } => {
                self.step = Step::Details;
                Ok(())
            }
            Step::Confirmation { processing: true } => Err(WizardError::TransferProcessing),
            _ => Err(self.invalid("edit")),
        }
    }

    /// Cancel from details or confirmation, closing the wizard
    pub fn cancel(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        match self.step {
            Step::Details | Step::Confirmation { processing: false } => {
                self.close();
                Ok(())
            }
            Step::Confirmation { processing: true } => Err(WizardError::TransferProcessing),
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Feedback back to an empty details step, keeping account and currency
    pub fn start_new_transfer(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        match self.step {
            Step::Feedback(_) => {
                self.draft = self.draft.carry_over();
                self.errors = ValidationErrors::new();
                self.step = Step::Details;
                Ok(())
            }
            _ => Err(self.invalid("start a new transfer")),
        }
    }

    pub fn receipt(&self) -> Result<Receipt, WizardError> {
        match &self.step {
            Step::Feedback(result) => receipt_service::build_receipt(result, &self.draft),
            _ => Err(self.invalid("download a receipt")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mock_accounts;
    use crate::services::transfer_service::FixedOutcome;

    fn filled_wizard(two_factor: bool) -> TransferWizard {
        let mut wizard = TransferWizard::new(mock_accounts(), two_factor);
        wizard.update_field(DraftField::FromAccount, "acc2").unwrap();
        wizard.update_field(DraftField::ToAccountNumber, "1234567890").unwrap();
        wizard.update_field(DraftField::RecipientName, "Jane").unwrap();
        wizard.update_field(DraftField::BankName, "Bank").unwrap();
        wizard.update_field(DraftField::Amount, "500").unwrap();
        wizard.update_field(DraftField::TransferType, "immediate").unwrap();
        wizard
    }

    #[test]
    fn test_skips_security_without_two_factor() {
        let mut wizard = filled_wizard(false);
        assert_eq!(wizard.proceed(), Ok(StepKind::Confirmation));
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn test_any_six_digit_code_passes_security() {
        let mut wizard = filled_wizard(true);
        assert_eq!(wizard.proceed(), Ok(StepKind::Security));
        wizard.send_otp(60).unwrap();
        wizard.update_field(DraftField::OtpCode, "654321").unwrap();
        assert_eq!(wizard.verify_otp(), Ok(StepKind::Confirmation));
    }

    #[test]
    fn test_invalid_details_stay_on_details() {
        let mut wizard = TransferWizard::new(mock_accounts(), false);
        let err = wizard.proceed().unwrap_err();
        match err {
            WizardError::Validation(errors) => assert_eq!(errors.len(), 5),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(wizard.step_kind(), StepKind::Details);
        assert_eq!(wizard.errors().len(), 5);
    }

    #[test]
    fn test_editing_clears_that_fields_error() {
        let mut wizard = TransferWizard::new(mock_accounts(), false);
        let _ = wizard.proceed();
        assert!(wizard.errors().get(DraftField::BankName).is_some());

        wizard.update_field(DraftField::BankName, "Bank").unwrap();
        assert!(wizard.errors().get(DraftField::BankName).is_none());
        assert!(wizard.errors().get(DraftField::RecipientName).is_some());
    }

    #[test]
    fn test_unknown_account_rejected() {
        let mut wizard = TransferWizard::new(mock_accounts(), false);
        let err = wizard.update_field(DraftField::FromAccount, "acc42").unwrap_err();
        assert!(matches!(err, WizardError::InvalidValue { .. }));
        assert!(wizard.draft().from_account.is_none());
    }

    #[test]
    fn test_otp_requires_send_and_six_digits() {
        let mut wizard = filled_wizard(true);
        wizard.proceed().unwrap();

        wizard.update_field(DraftField::OtpCode, "123456").unwrap();
        assert_eq!(wizard.verify_otp(), Err(WizardError::OtpNotSent));

        wizard.send_otp(60).unwrap();
        wizard.update_field(DraftField::OtpCode, "12345").unwrap();
        assert_eq!(wizard.verify_otp(), Err(WizardError::OtpIncomplete));
        assert_eq!(wizard.step_kind(), StepKind::Security);

        wizard.update_field(DraftField::OtpCode, "000000").unwrap();
        assert_eq!(wizard.verify_otp(), Ok(StepKind::Confirmation));
    }

    #[test]
    fn test_rejected_code_stays_on_security() {
        let mut wizard = filled_wizard(true);
        wizard.proceed().unwrap();
        wizard.send_otp(60).unwrap();
        wizard.update_field(DraftField::OtpCode, "123456").unwrap();
        wizard.begin_otp_verification().unwrap();

        assert_eq!(
            wizard.complete_otp_verification("12"),
            Err(WizardError::OtpRejected)
        );
        let challenge = wizard.otp_challenge().unwrap();
        assert!(!challenge.verifying);
        assert!(challenge.error.is_some());
    }

    #[test]
    fn test_details_fields_locked_outside_details() {
        let mut wizard = filled_wizard(true);
        wizard.proceed().unwrap();
        assert!(matches!(
            wizard.update_field(DraftField::Amount, "1"),
            Err(WizardError::InvalidTransition { .. })
        ));

        wizard.back().unwrap();
        assert!(matches!(
            wizard.update_field(DraftField::OtpCode, "123456"),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert!(wizard.update_field(DraftField::Amount, "1").is_ok());
    }

    #[test]
    fn test_back_then_reenter_gets_fresh_challenge() {
        let mut wizard = filled_wizard(true);
        wizard.proceed().unwrap();
        wizard.send_otp(60).unwrap();
        wizard.back().unwrap();
        assert_eq!(wizard.step_kind(), StepKind::Details);

        wizard.proceed().unwrap();
        assert_eq!(wizard.otp_challenge(), Some(&OtpChallenge::default()));
    }

    #[test]
    fn test_confirm_success_then_receipt() {
        let mut wizard = filled_wizard(false);
        wizard.proceed().unwrap();
        let result = wizard.confirm(&mut FixedOutcome(true)).unwrap().clone();
        assert!(result.success);
        assert_eq!(wizard.step_kind(), StepKind::Feedback);

        let receipt = wizard.receipt().unwrap();
        assert_eq!(receipt.transaction_id, result.transaction_id);
        assert_eq!(receipt.from.as_deref(), Some("****5678"));
    }

    #[test]
    fn test_confirm_failure_allows_new_transfer() {
        let mut wizard = filled_wizard(false);
        wizard.update_field(DraftField::Currency, "EUR").unwrap();
        wizard.proceed().unwrap();
        let result = wizard.confirm(&mut FixedOutcome(false)).unwrap().clone();
        assert!(!result.success);
        assert_eq!(result.transaction_id, None);
        assert_eq!(wizard.receipt(), Err(WizardError::ReceiptUnavailable));

        wizard.start_new_transfer().unwrap();
        assert_eq!(wizard.step_kind(), StepKind::Details);
        let draft = wizard.draft();
        assert_eq!(draft.from_account.as_ref().map(|a| a.id.as_str()), Some("acc2"));
        assert_eq!(draft.currency, "EUR");
        assert!(draft.to_account_number.is_empty());
        assert!(draft.amount.is_empty());
        assert!(wizard.result().is_none());
    }

    #[test]
    fn test_processing_blocks_edit_and_cancel() {
        let mut wizard = filled_wizard(false);
        wizard.proceed().unwrap();
        wizard.begin_confirm().unwrap();
        assert!(wizard.is_processing());
        assert_eq!(wizard.begin_confirm(), Err(WizardError::TransferProcessing));
        assert_eq!(wizard.edit(), Err(WizardError::TransferProcessing));
        assert_eq!(wizard.cancel(), Err(WizardError::TransferProcessing));
    }

    #[test]
    fn test_edit_keeps_draft() {
        let mut wizard = filled_wizard(false);
        wizard.proceed().unwrap();
        wizard.edit().unwrap();
        assert_eq!(wizard.step_kind(), StepKind::Details);
        assert_eq!(wizard.draft().amount, "500");
    }

    #[test]
    fn test_cancel_closes_and_reset_clears() {
        let mut wizard = filled_wizard(false);
        wizard.proceed().unwrap();
        wizard.cancel().unwrap();
        assert!(!wizard.is_open());
        assert_eq!(wizard.proceed(), Err(WizardError::NotOpen));
        assert_eq!(wizard.draft().amount, "500");

        wizard.reset();
        wizard.open();
        assert_eq!(wizard.step_kind(), StepKind::Details);
        assert_eq!(wizard.draft(), &TransferDraft::new());
    }

    #[test]
    fn test_wrong_step_actions_rejected() {
        let mut wizard = filled_wizard(false);
        assert!(matches!(wizard.back(), Err(WizardError::InvalidTransition { .. })));
        assert!(matches!(wizard.begin_confirm(), Err(WizardError::InvalidTransition { .. })));
        assert!(matches!(wizard.start_new_transfer(), Err(WizardError::InvalidTransition { .. })));
        assert!(matches!(wizard.send_otp(60), Err(WizardError::InvalidTransition { .. })));
        assert!(matches!(wizard.receipt(), Err(WizardError::InvalidTransition { .. })));
        assert_eq!(wizard.step_kind(), StepKind::Details);
    }

    #[test]
    fn test_fee_breakdown_follows_amount() {
        let mut wizard = filled_wizard(false);
        wizard.update_field(DraftField::Amount, "5000").unwrap();
        assert_eq!(wizard.fee_breakdown().map(|b| b.fee), Some(2.5));
    }
}
