use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            schedule: ScheduleConfig::from_env(),
        }
    }

    /// Return a redacted view safe for diagnostics output.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "api": {
                "base_url": self.api.base_url,
                "timeout_secs": self.api.timeout_secs,
            },
            "schedule": {
                "rules_file": self.schedule.rules_file,
            },
        })
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::debug!("Config loaded:");
        tracing::debug!(
            "  api:      base_url={}, timeout={}s",
            self.api.base_url,
            self.api.timeout_secs
        );
        tracing::debug!(
            "  schedule: rules_file={}",
            self.schedule
                .rules_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(built-in)".to_string())
        );
    }
}

// ── Backend API ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without the `/api` prefix.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    fn from_env() -> Self {
        Self {
            base_url: env_or("CHANJO_API_URL", "http://localhost:3001"),
            timeout_secs: env_u64("CHANJO_API_TIMEOUT_SECS", 30),
        }
    }
}

// ── Immunization schedule ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Optional YAML file replacing the built-in national rule table.
    pub rules_file: Option<PathBuf>,
}

impl ScheduleConfig {
    fn from_env() -> Self {
        Self {
            rules_file: env_opt("CHANJO_RULES_FILE").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        env::remove_var("CHANJO_API_URL");
        env::remove_var("CHANJO_API_TIMEOUT_SECS");
        env::remove_var("CHANJO_RULES_FILE");
        let config = Config::from_env();
        assert_eq!(config.api.base_url, "http://localhost:3001");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.schedule.rules_file.is_none());
    }

    #[test]
    fn env_u64_falls_back_on_garbage() {
        env::set_var("CHANJO_TEST_TIMEOUT", "not-a-number");
        assert_eq!(env_u64("CHANJO_TEST_TIMEOUT", 30), 30);
        env::remove_var("CHANJO_TEST_TIMEOUT");
    }

    #[test]
    fn empty_env_var_is_absent() {
        env::set_var("CHANJO_TEST_EMPTY", "");
        assert_eq!(env_opt("CHANJO_TEST_EMPTY"), None);
        env::remove_var("CHANJO_TEST_EMPTY");
    }
}
