//! Prometheus metrics and structured logging for craftbook.
//!
//! - Prometheus counters for resolutions, price lookups and analyses
//! - Structured logging with tracing (JSON in production)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
