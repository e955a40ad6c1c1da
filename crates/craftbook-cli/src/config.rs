//! Application configuration.

use crate::error::{AppError, AppResult};
use craftbook_analytics::{AnalyticsConfig, DEFAULT_MIN_PRICE_THRESHOLD, MAX_WINDOW_DAYS};
use craftbook_core::RegionKey;
use craftbook_registry::MarketClientConfig;
use craftbook_resolver::ResolverConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Where recipe data lives and where to fetch it when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSourceConfig {
    #[serde(default = "default_recipes_path")]
    pub path: String,
    #[serde(default = "default_recipes_url")]
    pub url: String,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

fn default_recipes_path() -> String {
    "data/recipes.json".to_string()
}

fn default_recipes_url() -> String {
    "https://raw.githubusercontent.com/ffxiv-teamcraft/ffxiv-teamcraft/master/libs/data/src/lib/json/recipes.json"
        .to_string()
}

fn default_download_timeout_secs() -> u64 {
    60
}

impl Default for RecipeSourceConfig {
    fn default() -> Self {
        Self {
            path: default_recipes_path(),
            url: default_recipes_url(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

impl RecipeSourceConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// Longest hot-item sales window, in hours.
pub const MAX_WINDOW_HOURS: u32 = MAX_WINDOW_DAYS * 24;

/// Hot-item screening defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotItemsConfig {
    /// Sales window in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    /// Recently updated items to screen.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_min_price_threshold")]
    pub min_price_threshold: Decimal,
}

fn default_window_hours() -> u32 {
    24
}

fn default_sample_size() -> usize {
    200
}

fn default_min_price_threshold() -> Decimal {
    DEFAULT_MIN_PRICE_THRESHOLD
}

impl Default for HotItemsConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            sample_size: default_sample_size(),
            min_price_threshold: default_min_price_threshold(),
        }
    }
}

/// Top-level configuration, read from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Region used when a command does not name one.
    #[serde(default = "default_region")]
    pub default_region: String,
    #[serde(default)]
    pub market: MarketClientConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub recipes: RecipeSourceConfig,
    #[serde(default)]
    pub hot_items: HotItemsConfig,
}

fn default_region() -> String {
    "Japan".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            market: MarketClientConfig::default(),
            resolver: ResolverConfig::default(),
            analytics: AnalyticsConfig::default(),
            recipes: RecipeSourceConfig::default(),
            hot_items: HotItemsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load from `path` if it exists, otherwise use defaults. Validates either way.
    pub fn load(path: &str) -> AppResult<Self> {
        let config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.market.validate()?;
        self.analytics.validate()?;
        if self.resolver.max_depth == 0 {
            return Err(AppError::Config("resolver.max_depth must be at least 1".to_string()));
        }
        check_window_hours(self.hot_items.window_hours)?;
        if self.hot_items.sample_size == 0 {
            return Err(AppError::Config("hot_items.sample_size must be at least 1".to_string()));
        }
        if self.hot_items.min_price_threshold.is_sign_negative() {
            return Err(AppError::Config(
                "hot_items.min_price_threshold must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// `requested` when given and non-blank, else the configured default.
    pub fn region(&self, requested: Option<&str>) -> RegionKey {
        let fallback = RegionKey::new(&self.default_region);
        match requested {
            Some(name) => RegionKey::new(name).or(fallback),
            None => fallback,
        }
    }
}

/// Reject sales windows longer than `MAX_WINDOW_HOURS`.
pub fn check_window_hours(hours: u32) -> AppResult<()> {
    if hours > MAX_WINDOW_HOURS {
        return Err(AppError::Config(format!(
            "hot_items.window_hours ({hours}) must be at most {MAX_WINDOW_HOURS}"
        )));
    }
    Ok(())
}
