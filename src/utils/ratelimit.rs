use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use tokio::sync::Mutex;

const COOLDOWN_SECONDS: u64 = 2;
const GLOBAL_RATE_LIMIT: usize = 50; // requests per second
const RATE_WINDOW_MS: u64 = 1000;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<Cooldowns> = Mutex::new(Cooldowns::new(COOLDOWN_SECONDS));
    static ref GLOBAL_REQUESTS: Mutex<SlidingWindow> =
        Mutex::new(SlidingWindow::new(GLOBAL_RATE_LIMIT, RATE_WINDOW_MS));
}

/// Per-user, per-command cooldowns
pub struct Cooldowns {
    seconds: u64,
    last_used: HashMap<(u64, String), u64>,
    // When each key was last warned, so a user hammering a command gets one warning
    last_warned: HashMap<(u64, String), u64>,
}

impl Cooldowns {
    pub fn new(seconds: u64) -> Self {
        Cooldowns {
            seconds,
            last_used: HashMap::new(),
            last_warned: HashMap::new(),
        }
    }

    /// `Ok` records the use. `Err((remaining, should_warn))` while cooling down;
    /// `should_warn` is only true for the first refusal of each cooldown period.
    pub fn check(&mut self, user_id: u64, command: &str, now_secs: u64) -> Result<(), (u64, bool)> {
        let key = (user_id, command.to_string());

        if let Some(&last) = self.last_used.get(&key) {
            let elapsed = now_secs.saturating_sub(last);
            if elapsed < self.seconds {
                let should_warn = self
                    .last_warned
                    .get(&key)
                    .map_or(true, |&warned| warned < last);
                if should_warn {
                    self.last_warned.insert(key, now_secs);
                }
                return Err((self.seconds - elapsed, should_warn));
            }
        }

        self.last_used.insert(key, now_secs);
        Ok(())
    }
}

/// Fixed-size sliding window over request timestamps
pub struct SlidingWindow {
    limit: usize,
    window_ms: u64,
    requests: VecDeque<u64>,
}

impl SlidingWindow {
    pub fn new(limit: usize, window_ms: u64) -> Self {
        SlidingWindow {
            limit,
            window_ms,
            requests: VecDeque::new(),
        }
    }

    /// `Err(ms)` until the oldest request leaves the window
    pub fn check(&mut self, now_ms: u64) -> Result<(), u64> {
        let window_start = now_ms.saturating_sub(self.window_ms);
        while self.requests.front().is_some_and(|&t| t <= window_start) {
            self.requests.pop_front();
        }

        if self.requests.len() >= self.limit {
            let oldest = self.requests.front().copied().unwrap_or(now_ms);
            return Err((oldest + self.window_ms).saturating_sub(now_ms));
        }

        self.requests.push_back(now_ms);
        Ok(())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Check if a user can run a command yet
pub async fn check_cooldown(user_id: u64, command: &str) -> Result<(), (u64, bool)> {
    COMMAND_COOLDOWNS
        .lock()
        .await
        .check(user_id, command, now_millis() / 1000)
}

/// Check the global limit across all users
pub async fn check_global_rate_limit() -> Result<(), u64> {
    GLOBAL_REQUESTS.lock().await.check(now_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_warns_once_per_period() {
        let mut cooldowns = Cooldowns::new(2);
        assert!(cooldowns.check(1, "$transfer confirm", 100).is_ok());
        assert_eq!(cooldowns.check(1, "$transfer confirm", 101), Err((1, true)));
        assert_eq!(cooldowns.check(1, "$transfer confirm", 101), Err((1, false)));

        // other users and commands are independent
        assert!(cooldowns.check(2, "$transfer confirm", 101).is_ok());
        assert!(cooldowns.check(1, "$accounts", 101).is_ok());

        assert!(cooldowns.check(1, "$transfer confirm", 102).is_ok());
        assert_eq!(cooldowns.check(1, "$transfer confirm", 103), Err((1, true)));
    }

    #[test]
    fn test_sliding_window_blocks_over_limit() {
        let mut window = SlidingWindow::new(3, 1000);
        for t in [100, 110, 120] {
            assert!(window.check(t).is_ok());
        }
        assert_eq!(window.check(500), Err(600));
        assert!(window.check(1101).is_ok());
        assert_eq!(window.check(1102), Err(8));
    }
}
