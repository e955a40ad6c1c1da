//! Market health metrics for craftbook.
//!
//! `analyze` turns one item's listings and sale history into trading
//! statistics: sale velocity, a tiered average price, effective stock,
//! cross-region arbitrage and snipe opportunities. `screen_hot_items` ranks
//! many items by recent sales.
//!
//! Everything here is a pure function of its inputs and the clock value
//! passed in.

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod screen;
pub mod stats;

pub use config::{AnalyticsConfig, MAX_WINDOW_DAYS};
pub use engine::{analyze, analyze_at, DAYS_TO_SELL_UNBOUNDED};
pub use error::{AnalyticsError, AnalyticsResult};
pub use metrics::{AveragePriceType, MarketMetrics, StackPopularity};
pub use screen::{screen_hot_items, HotItem, DEFAULT_MIN_PRICE_THRESHOLD};
