//! Simulated one-time passcode challenge
//!
//! Nothing is actually sent. Any 6-digit code passes; "123456" is the code
//! advertised to testers.

use tracing::info;

use crate::models::draft::OTP_LENGTH;
use crate::utils::errors::WizardError;

pub const SENTINEL_OTP: &str = "123456";
pub const DEFAULT_RESEND_SECONDS: u64 = 60;

/// Per-visit state of the security step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtpChallenge {
    pub sent: bool,
    /// Seconds left before a resend is allowed
    pub countdown: u64,
    pub verifying: bool,
    pub error: Option<String>,
}

impl OtpChallenge {
    /// Send (or resend) a code and restart the countdown
    pub fn send(&mut self, resend_seconds: u64) -> Result<(), WizardError> {
        if !self.can_resend() {
            return Err(WizardError::ResendLocked(self.countdown));
        }
        self.sent = true;
        self.countdown = resend_seconds;
        self.error = None;
        info!("OTP sent to registered mobile/email");
        Ok(())
    }

    /// One second elapsed. Returns the seconds still remaining.
    pub fn tick(&mut self) -> u64 {
        self.countdown = self.countdown.saturating_sub(1);
        self.countdown
    }

    pub fn can_resend(&self) -> bool {
        self.countdown == 0
    }
}

/// Exactly six ASCII digits
pub fn is_complete(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

/// Simulated check: the sentinel or any complete code is accepted
pub fn is_acceptable(code: &str) -> bool {
    code == SENTINEL_OTP || is_complete(code)
}
