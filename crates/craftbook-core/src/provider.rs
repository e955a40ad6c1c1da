//! Collaborator interfaces consumed by the engines.
//!
//! Both are synchronous from the engines' point of view. Implementations own
//! any caching, retries or timeouts.

use crate::{ItemId, MarketSnapshot, Recipe, RegionKey};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Snapshots returned by a batch price lookup.
pub type SnapshotMap = HashMap<ItemId, MarketSnapshot>;

/// A failed batch price lookup.
///
/// `status` follows HTTP conventions (e.g. 503); transport failures that never
/// produced a response use 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("price book request failed ({status}): {message}")]
pub struct PriceBookError {
    pub status: u16,
    pub message: String,
}

impl PriceBookError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Failure without an upstream status code.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }
}

pub type PriceBookResult<T> = std::result::Result<T, PriceBookError>;

/// Recipe lookup.
///
/// Must be safe to call repeatedly with the same id.
pub trait RecipeGraph: Send + Sync {
    /// The recipe producing `item_id`, or `None` for raw goods.
    fn get_recipe(&self, item_id: ItemId) -> Option<Recipe>;
}

/// Batch market-board lookup.
pub trait PriceBook: Send + Sync {
    /// Snapshots for `item_ids` in `region`.
    ///
    /// Ids without market data may be absent from the map. Any error means the
    /// whole batch is unusable.
    fn fetch_batch(&self, region: &RegionKey, item_ids: &[ItemId]) -> PriceBookResult<SnapshotMap>;
}

impl<T: RecipeGraph + ?Sized> RecipeGraph for Arc<T> {
    fn get_recipe(&self, item_id: ItemId) -> Option<Recipe> {
        (**self).get_recipe(item_id)
    }
}

impl<T: PriceBook + ?Sized> PriceBook for Arc<T> {
    fn fetch_batch(&self, region: &RegionKey, item_ids: &[ItemId]) -> PriceBookResult<SnapshotMap> {
        (**self).fetch_batch(region, item_ids)
    }
}
