//! Per-user wizard sessions and their timers
//!
//! Every session carries a lifetime epoch that moves forward on open and
//! close. Timers capture the epoch when spawned and only touch the wizard if
//! it is unchanged, so a reopened wizard never sees a stale update. Timer
//! handles are kept on the session and aborted when superseded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WizardConfig;
use crate::models::{Account, DraftField, Receipt, StepKind, TransactionResult};
use crate::services::transfer_service::{self, OutcomeSource};
use crate::services::wizard_service::TransferWizard;
use crate::utils::errors::{SessionError, WizardError};

pub type SharedOutcome = Arc<Mutex<Box<dyn OutcomeSource>>>;

/// All open (or recently closed) wizards, keyed by Discord user id
pub struct WizardRegistry {
    config: WizardConfig,
    accounts: Vec<Arc<Account>>,
    outcome: SharedOutcome,
    sessions: Mutex<HashMap<u64, Arc<WizardSession>>>,
}

impl WizardRegistry {
    pub fn new(
        config: WizardConfig,
        accounts: Vec<Arc<Account>>,
        outcome: Box<dyn OutcomeSource>,
    ) -> Self {
        WizardRegistry {
            config,
            accounts,
            outcome: Arc::new(Mutex::new(outcome)),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn accounts(&self) -> &[Arc<Account>] {
        &self.accounts
    }

    /// Open the user's wizard, creating the session on first use
    pub async fn open(&self, user_id: u64) -> TransferWizard {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .entry(user_id)
                .or_insert_with(|| {
                    let mut wizard =
                        TransferWizard::new(self.accounts.clone(), self.config.two_factor);
                    wizard.close();
                    Arc::new(WizardSession::new(
                        user_id,
                        wizard,
                        self.config.clone(),
                        Arc::clone(&self.outcome),
                    ))
                })
                .clone()
        };
        session.reopen().await
    }

    /// Number of wizards currently open
    pub async fn open_count(&self) -> usize {
        let sessions = self.sessions.lock().await;
        let mut open = 0;
        for session in sessions.values() {
            if session.is_open().await {
                open += 1;
            }
        }
        open
    }

    pub async fn session(&self, user_id: u64) -> Result<Arc<WizardSession>, SessionError> {
        self.sessions
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(SessionError::NoSession)
    }
}

/// A confirmed transfer waiting on its outcome
pub struct PendingTransfer {
    wizard: TransferWizard,
    receiver: oneshot::Receiver<TransactionResult>,
}

impl PendingTransfer {
    /// The wizard as it was when processing started
    pub fn wizard(&self) -> &TransferWizard {
        &self.wizard
    }

    /// `Superseded` if the wizard was closed before the outcome landed
    pub async fn outcome(self) -> Result<TransactionResult, SessionError> {
        self.receiver.await.map_err(|_| SessionError::Superseded)
    }
}

struct SessionState {
    wizard: TransferWizard,
    epoch: u64,
    // Bumped by every OTP check and by leaving the security step
    otp_attempt: u64,
    correlation_id: Uuid,
    reset_task: Option<JoinHandle<()>>,
    countdown_task: Option<JoinHandle<()>>,
    confirm_task: Option<JoinHandle<()>>,
}

impl SessionState {
    fn abort_countdown(&mut self) {
        if let Some(task) = self.countdown_task.take() {
            task.abort();
        }
    }

    fn abort_all(&mut self) {
        self.abort_countdown();
        if let Some(task) = self.confirm_task.take() {
            task.abort();
        }
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

/// One user's wizard plus the timers scheduled against it
pub struct WizardSession {
    user_id: u64,
    config: WizardConfig,
    outcome: SharedOutcome,
    state: Mutex<SessionState>,
}

impl WizardSession {
    fn new(user_id: u64, wizard: TransferWizard, config: WizardConfig, outcome: SharedOutcome) -> Self {
        WizardSession {
            user_id,
            config,
            outcome,
            state: Mutex::new(SessionState {
                wizard,
                epoch: 0,
                otp_attempt: 0,
                correlation_id: Uuid::new_v4(),
                reset_task: None,
                countdown_task: None,
                confirm_task: None,
            }),
        }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub async fn is_open(&self) -> bool {
        self.state.lock().await.wizard.is_open()
    }

    /// Copy of the wizard for rendering
    pub async fn snapshot(&self) -> TransferWizard {
        self.state.lock().await.wizard.clone()
    }

    /// Make the wizard visible again. A pending deferred reset is superseded
    /// by resetting right away.
    pub async fn reopen(&self) -> TransferWizard {
        let mut state = self.state.lock().await;
        if state.wizard.is_open() {
            debug!(user_id = self.user_id, "Transfer wizard already open");
            return state.wizard.clone();
        }

        state.abort_all();
        state.wizard.reset();
        state.wizard.open();
        state.epoch += 1;
        state.correlation_id = Uuid::new_v4();
        info!(
            user_id = self.user_id,
            session = %state.correlation_id,
            "Transfer wizard opened"
        );
        state.wizard.clone()
    }

    pub async fn update_field(
        &self,
        field: DraftField,
        value: &str,
    ) -> Result<TransferWizard, SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.update_field(field, value)?;
        debug!(user_id = self.user_id, %field, "Draft field updated");
        Ok(state.wizard.clone())
    }

    pub async fn proceed(&self) -> Result<TransferWizard, SessionError> {
        let mut state = self.state.lock().await;
        let next = state.wizard.proceed()?;
        debug!(user_id = self.user_id, step = %next, "Transfer details accepted");
        Ok(state.wizard.clone())
    }

    /// Send (or resend) the simulated OTP and restart the countdown timer
    pub async fn send_otp(self: &Arc<Self>) -> Result<TransferWizard, SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.send_otp(self.config.otp_resend_seconds)?;

        state.abort_countdown();
        let epoch = state.epoch;
        let session = Arc::clone(self);
        state.countdown_task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let mut state = session.state.lock().await;
                if state.epoch != epoch {
                    break;
                }
                match state.wizard.tick_countdown() {
                    Some(0) | None => break,
                    Some(_) => {}
                }
            }
        }));

        Ok(state.wizard.clone())
    }

    /// Verify the entered OTP after the simulated latency
    pub async fn verify_otp(&self) -> Result<TransferWizard, SessionError> {
        let (code, epoch, attempt) = {
            let mut state = self.state.lock().await;
            let code = state.wizard.begin_otp_verification()?;
            state.otp_attempt += 1;
            (code, state.epoch, state.otp_attempt)
        };

        tokio::time::sleep(self.config.otp_verify_delay).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return Err(SessionError::Superseded);
        }
        if state.otp_attempt != attempt {
            debug!(user_id = self.user_id, "Dropping stale OTP check");
            return Err(SessionError::VerificationInterrupted);
        }
        match state.wizard.complete_otp_verification(&code) {
            Ok(_) => {
                state.abort_countdown();
                debug!(user_id = self.user_id, "OTP verified");
                Ok(state.wizard.clone())
            }
            Err(WizardError::InvalidTransition { .. }) => Err(SessionError::VerificationInterrupted),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn back(&self) -> Result<TransferWizard, SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.back()?;
        state.otp_attempt += 1;
        state.abort_countdown();
        Ok(state.wizard.clone())
    }

    /// Confirm the transfer. Returns once the wizard is processing; the
    /// outcome lands after the simulated latency unless the wizard is closed
    /// first.
    pub async fn confirm(self: &Arc<Self>) -> Result<PendingTransfer, SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.begin_confirm()?;

        let epoch = state.epoch;
        let session = Arc::clone(self);
        let (sender, receiver) = oneshot::channel();
        state.confirm_task = Some(tokio::spawn(async move {
            tokio::time::sleep(session.config.confirm_delay).await;
            let result = {
                let mut source = session.outcome.lock().await;
                transfer_service::draw_result(&mut **source)
            };

            let mut state = session.state.lock().await;
            if state.epoch != epoch {
                return;
            }
            match state.wizard.complete_confirm(result.clone()) {
                Ok(()) => {
                    state.confirm_task = None;
                    info!(
                        user_id = session.user_id,
                        session = %state.correlation_id,
                        success = result.success,
                        transaction_id = result.transaction_id.as_deref().unwrap_or("-"),
                        "Transfer outcome"
                    );
                    let _ = sender.send(result);
                }
                Err(e) => warn!(user_id = session.user_id, "Dropping transfer outcome: {}", e),
            }
        }));

        Ok(PendingTransfer {
            wizard: state.wizard.clone(),
            receiver,
        })
    }

    pub async fn edit(&self) -> Result<TransferWizard, SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.edit()?;
        Ok(state.wizard.clone())
    }

    pub async fn start_new_transfer(&self) -> Result<TransferWizard, SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.start_new_transfer()?;
        debug!(user_id = self.user_id, "Starting new transfer");
        Ok(state.wizard.clone())
    }

    pub async fn receipt(&self) -> Result<Receipt, SessionError> {
        Ok(self.state.lock().await.wizard.receipt()?)
    }

    /// Cancel from details or confirmation
    pub async fn cancel(self: &Arc<Self>) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.wizard.cancel()?;
        self.schedule_reset(&mut state);
        Ok(())
    }

    /// Close from any step. Returns the step that was showing.
    pub async fn close(self: &Arc<Self>) -> Result<StepKind, SessionError> {
        let mut state = self.state.lock().await;
        if !state.wizard.is_open() {
            return Err(WizardError::NotOpen.into());
        }
        let step = state.wizard.step_kind();
        state.wizard.close();
        self.schedule_reset(&mut state);
        Ok(step)
    }

    fn schedule_reset(self: &Arc<Self>, state: &mut SessionState) {
        state.abort_all();
        state.epoch += 1;
        info!(
            user_id = self.user_id,
            session = %state.correlation_id,
            "Transfer wizard closed"
        );

        let epoch = state.epoch;
        let session = Arc::clone(self);
        state.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(session.config.reset_delay).await;
            let mut state = session.state.lock().await;
            if state.epoch == epoch {
                state.wizard.reset();
                state.reset_task = None;
                debug!(user_id = session.user_id, "Transfer wizard reset");
            }
        }));
    }
}
