//! Analytics configuration.

use crate::error::{AnalyticsError, AnalyticsResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Longest trailing window, in days, accepted for velocity and averages.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Options consumed by `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window for velocity, in days. Values below 1 are treated as 1.
    #[serde(default = "default_velocity_window_days")]
    pub velocity_window_days: u32,
    /// Most recent sales averaged for the Normal tier.
    #[serde(default = "default_average_price_sample_count")]
    pub average_price_sample_count: usize,
    /// Sales older than this many days do not count for the Normal tier.
    #[serde(default = "default_average_price_window_days")]
    pub average_price_window_days: u32,
    /// Market tax in percent (5 = 5%).
    #[serde(default = "default_market_tax_rate_percent")]
    pub market_tax_rate_percent: Decimal,
    /// Total snipe profit that always qualifies.
    #[serde(default = "default_snipe_minimum_profit")]
    pub snipe_minimum_profit: Decimal,
}

fn default_velocity_window_days() -> u32 {
    7
}

fn default_average_price_sample_count() -> usize {
    20
}

fn default_average_price_window_days() -> u32 {
    30
}

fn default_market_tax_rate_percent() -> Decimal {
    Decimal::from(5)
}

fn default_snipe_minimum_profit() -> Decimal {
    Decimal::from(2000)
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            velocity_window_days: default_velocity_window_days(),
            average_price_sample_count: default_average_price_sample_count(),
            average_price_window_days: default_average_price_window_days(),
            market_tax_rate_percent: default_market_tax_rate_percent(),
            snipe_minimum_profit: default_snipe_minimum_profit(),
        }
    }
}

impl AnalyticsConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - market_tax_rate_percent is outside 0..=100
    /// - snipe_minimum_profit < 0
    /// - a window is longer than `MAX_WINDOW_DAYS`
    pub fn validate(&self) -> AnalyticsResult<()> {
        for (name, days) in [
            ("velocity_window_days", self.velocity_window_days),
            ("average_price_window_days", self.average_price_window_days),
        ] {
            if days > MAX_WINDOW_DAYS {
                return Err(AnalyticsError::Config(format!(
                    "{name} ({days}) must be at most {MAX_WINDOW_DAYS}"
                )));
            }
        }

        if self.market_tax_rate_percent.is_sign_negative()
            || self.market_tax_rate_percent > Decimal::ONE_HUNDRED
        {
            return Err(AnalyticsError::Config(format!(
                "market_tax_rate_percent ({}) must be within 0..=100",
                self.market_tax_rate_percent
            )));
        }

        if self.snipe_minimum_profit.is_sign_negative() {
            return Err(AnalyticsError::Config(format!(
                "snipe_minimum_profit ({}) must be non-negative",
                self.snipe_minimum_profit
            )));
        }

        Ok(())
    }

    /// Velocity window, never below one day.
    pub fn velocity_days(&self) -> u32 {
        self.velocity_window_days.max(1)
    }

    /// Tax as a fraction (0.05 for 5%).
    pub fn tax_rate(&self) -> Decimal {
        self.market_tax_rate_percent / Decimal::ONE_HUNDRED
    }
}
