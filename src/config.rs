use std::str::FromStr;
use std::time::Duration;

use crate::services::otp_service::DEFAULT_RESEND_SECONDS;
use crate::services::transfer_service::DEFAULT_SUCCESS_RATE;
use crate::utils::errors::ConfigError;

/// Wizard tuning read from the environment (`.env` is loaded first)
#[derive(Debug, Clone, PartialEq)]
pub struct WizardConfig {
    pub two_factor: bool,
    pub success_rate: f64,
    pub confirm_delay: Duration,
    pub otp_verify_delay: Duration,
    pub reset_delay: Duration,
    pub otp_resend_seconds: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        WizardConfig {
            two_factor: true,
            success_rate: DEFAULT_SUCCESS_RATE,
            confirm_delay: Duration::from_millis(1500),
            otp_verify_delay: Duration::from_millis(1000),
            reset_delay: Duration::from_millis(300),
            otp_resend_seconds: DEFAULT_RESEND_SECONDS,
        }
    }
}

impl WizardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WizardConfig::default();

        let two_factor = match lookup("TRANSFER_2FA_ENABLED") {
            Some(raw) => parse_bool("TRANSFER_2FA_ENABLED", &raw)?,
            None => defaults.two_factor,
        };

        let success_rate = parse_or("TRANSFER_SUCCESS_RATE", &lookup, defaults.success_rate)?;
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(ConfigError::Invalid {
                key: "TRANSFER_SUCCESS_RATE".to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }

        let confirm_ms = parse_or(
            "TRANSFER_CONFIRM_DELAY_MS",
            &lookup,
            defaults.confirm_delay.as_millis() as u64,
        )?;
        let verify_ms = parse_or(
            "TRANSFER_OTP_VERIFY_DELAY_MS",
            &lookup,
            defaults.otp_verify_delay.as_millis() as u64,
        )?;
        let reset_ms = parse_or(
            "TRANSFER_RESET_DELAY_MS",
            &lookup,
            defaults.reset_delay.as_millis() as u64,
        )?;
        let otp_resend_seconds =
            parse_or("TRANSFER_OTP_RESEND_SECONDS", &lookup, defaults.otp_resend_seconds)?;

        Ok(WizardConfig {
            two_factor,
            success_rate,
            confirm_delay: Duration::from_millis(confirm_ms),
            otp_verify_delay: Duration::from_millis(verify_ms),
            reset_delay: Duration::from_millis(reset_ms),
            otp_resend_seconds,
        })
    }
}

/// Read the bot token
pub fn discord_token() -> Result<String, ConfigError> {
    std::env::var("DISCORD_TOKEN").map_err(|_| ConfigError::Missing("DISCORD_TOKEN".to_string()))
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = WizardConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WizardConfig::default());
        assert!(config.two_factor);
        assert_eq!(config.otp_resend_seconds, 60);
    }

    #[test]
    fn test_overrides() {
        let config = WizardConfig::from_lookup(lookup(&[
            ("TRANSFER_2FA_ENABLED", "off"),
            ("TRANSFER_SUCCESS_RATE", "0.5"),
            ("TRANSFER_RESET_DELAY_MS", "10"),
        ]))
        .unwrap();
        assert!(!config.two_factor);
        assert_eq!(config.success_rate, 0.5);
        assert_eq!(config.reset_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_invalid_values() {
        assert!(WizardConfig::from_lookup(lookup(&[("TRANSFER_SUCCESS_RATE", "1.5")])).is_err());
        assert!(WizardConfig::from_lookup(lookup(&[("TRANSFER_2FA_ENABLED", "sometimes")])).is_err());
        assert!(WizardConfig::from_lookup(lookup(&[("TRANSFER_CONFIRM_DELAY_MS", "-1")])).is_err());
    }
}
