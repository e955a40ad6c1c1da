//! Market client configuration.

use crate::error::{RegistryError, RegistryResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Market board client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketClientConfig {
    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Item ids per request. Long id lists overflow the URL.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Sale history entries requested per item.
    #[serde(default = "default_history_entries")]
    pub history_entries: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for 5xx and transport failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit; attempt n waits n x this.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Pause between consecutive chunk requests.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://universalis.app/api/v2".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_history_entries() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    180
}

fn default_batch_pause_ms() -> u64 {
    300
}

fn default_user_agent() -> String {
    concat!("craftbook/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for MarketClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            batch_size: default_batch_size(),
            history_entries: default_history_entries(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            batch_pause_ms: default_batch_pause_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl MarketClientConfig {
    pub fn validate(&self) -> RegistryResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(RegistryError::Config("base_url must not be empty".to_string()));
        }
        if self.batch_size == 0 {
            return Err(RegistryError::Config("batch_size must be positive".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(RegistryError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketClientConfig::default();
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.history_entries, 500);
        assert_eq!(config.cache_ttl(), Duration::from_secs(180));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MarketClientConfig = serde_json::from_str(r#"{"batch_size": 10}"#).unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_linear_backoff() {
        let config = MarketClientConfig::default();
        assert_eq!(config.backoff(1), Duration::from_millis(1000));
        assert_eq!(config.backoff(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_rejects_zero_batch() {
        let config = MarketClientConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
