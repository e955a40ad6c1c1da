//! Resolver error types.

use craftbook_core::{CoreError, ItemId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("Cost overflow while pricing item {0}")]
    Overflow(ItemId),
}

pub type ResolverResult<T> = Result<T, ResolverError>;
