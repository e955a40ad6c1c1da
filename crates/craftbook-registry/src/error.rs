//! Registry error types.

use craftbook_core::PriceBookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Recipe data error: {0}")]
    RecipeData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl From<RegistryError> for PriceBookError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::HttpStatus { status, body } => {
                let message = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                PriceBookError::new(status, message)
            }
            other => PriceBookError::transport(other.to_string()),
        }
    }
}
