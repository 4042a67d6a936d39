//! Mocked transfer execution
//!
//! No money moves. A confirmed transfer draws success or failure from an
//! [`OutcomeSource`] and gets a time based transaction id on success.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::transaction::{FAILURE_MESSAGE, SUCCESS_MESSAGE};
use crate::models::TransactionResult;

pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

static LAST_TRANSACTION_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Decides whether a simulated transfer succeeds
pub trait OutcomeSource: Send {
    fn draw_success(&mut self) -> bool;
}

/// Production source: succeeds with the configured probability
pub struct RandomOutcome {
    rng: StdRng,
    success_rate: f64,
}

impl RandomOutcome {
    /// `success_rate` is clamped into 0.0..=1.0
    pub fn new(success_rate: f64) -> Self {
        RandomOutcome {
            rng: StdRng::from_entropy(),
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    #[cfg(test)]
    pub fn seeded(success_rate: f64, seed: u64) -> Self {
        RandomOutcome {
            rng: StdRng::seed_from_u64(seed),
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

impl OutcomeSource for RandomOutcome {
    fn draw_success(&mut self) -> bool {
        self.rng.gen_bool(self.success_rate)
    }
}

/// Always yields the same outcome
#[cfg(test)]
pub struct FixedOutcome(pub bool);

#[cfg(test)]
impl OutcomeSource for FixedOutcome {
    fn draw_success(&mut self) -> bool {
        self.0
    }
}

/// `TXN<epoch millis>`, strictly increasing within the process
pub fn next_transaction_id(now: DateTime<Utc>) -> String {
    let now_ms = now.timestamp_millis();
    let previous = LAST_TRANSACTION_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_ms.max(last + 1))
        })
        .unwrap_or(now_ms);
    format!("TXN{}", now_ms.max(previous + 1))
}

pub fn build_result(success: bool, now: DateTime<Utc>) -> TransactionResult {
    TransactionResult {
        success,
        transaction_id: success.then(|| next_transaction_id(now)),
        message: (if success { SUCCESS_MESSAGE } else { FAILURE_MESSAGE }).to_string(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Draw one outcome and wrap it in a result stamped with the current time
pub fn draw_result(source: &mut dyn OutcomeSource) -> TransactionResult {
    let success = source.draw_success();
    build_result(success, Utc::now())
}
