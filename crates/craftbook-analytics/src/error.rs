//! Analytics error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
