//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] craftbook_registry::RegistryError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] craftbook_analytics::AnalyticsError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] craftbook_telemetry::TelemetryError),

    #[error("Invalid market data: {0}")]
    InvalidData(#[from] craftbook_core::CoreError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
