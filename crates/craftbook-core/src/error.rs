//! Error types for craftbook-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid recipe: {0}")]
    InvalidRecipe(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
