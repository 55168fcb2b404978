use std::str::FromStr;

use anyhow::{Context, Result};

use crate::tracking::progress::CompletionPolicy;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
    /// Seconds between background deadline sweeps.
    pub sweep_interval_secs: u64,
    /// When set, deadline notifications carry a per-day idempotency key.
    pub deadline_dedup: bool,
    pub completion_policy: CompletionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = CompletionPolicy::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            sweep_interval_secs: optional_env("DEADLINE_SWEEP_INTERVAL_SECS", 3600)?,
            deadline_dedup: optional_env("DEADLINE_NOTIFICATION_DEDUP", false)?,
            completion_policy: CompletionPolicy {
                in_progress_bonus: optional_env(
                    "COMPLETION_IN_PROGRESS_BONUS",
                    defaults.in_progress_bonus,
                )?,
                paused_factor: optional_env("COMPLETION_PAUSED_FACTOR", defaults.paused_factor)?,
                planning_cap: optional_env("COMPLETION_PLANNING_CAP", defaults.planning_cap)?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_env_falls_back_to_default() {
        let value: u64 = optional_env("PIVOT_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_optional_env_rejects_garbage() {
        std::env::set_var("PIVOT_TEST_BAD_PORT", "not-a-port");
        let result: Result<u16> = optional_env("PIVOT_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("PIVOT_TEST_BAD_PORT");
    }

    #[test]
    fn test_optional_env_parses_bool() {
        std::env::set_var("PIVOT_TEST_DEDUP", "true");
        let value: bool = optional_env("PIVOT_TEST_DEDUP", false).unwrap();
        assert!(value);
        std::env::remove_var("PIVOT_TEST_DEDUP");
    }
}
