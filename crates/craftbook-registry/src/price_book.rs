//! `PriceBook` implementations.

use crate::client::MarketClient;
use craftbook_core::{
    ItemId, MarketSnapshot, PriceBook, PriceBookError, PriceBookResult, RegionKey, SnapshotMap,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::warn;

/// Synchronous view of a `MarketClient`.
///
/// `fetch_batch` blocks on the runtime behind `handle`, so it must be called
/// from a blocking thread (`spawn_blocking`), never from inside an async task.
pub struct BlockingPriceBook {
    client: Arc<MarketClient>,
    handle: Handle,
}

impl BlockingPriceBook {
    pub fn new(client: Arc<MarketClient>, handle: Handle) -> Self {
        Self { client, handle }
    }

    pub fn client(&self) -> &Arc<MarketClient> {
        &self.client
    }
}

impl PriceBook for BlockingPriceBook {
    fn fetch_batch(&self, region: &RegionKey, item_ids: &[ItemId]) -> PriceBookResult<SnapshotMap> {
        self.handle
            .block_on(self.client.fetch_batch(region, item_ids))
            .map_err(|e| {
                warn!(%region, error = %e, "Market batch failed");
                PriceBookError::from(e)
            })
    }
}

/// In-memory price book over fixed snapshots, for offline runs and tests.
///
/// The region is ignored. A configured failure is returned for every call.
#[derive(Default)]
pub struct StaticPriceBook {
    snapshots: RwLock<SnapshotMap>,
    failure: Option<PriceBookError>,
    requests: AtomicUsize,
}

impl StaticPriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A price book whose every lookup fails with `error`.
    pub fn failing(error: PriceBookError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn with_snapshot(self, item_id: ItemId, snapshot: MarketSnapshot) -> Self {
        self.insert(item_id, snapshot);
        self
    }

    pub fn insert(&self, item_id: ItemId, snapshot: MarketSnapshot) {
        self.snapshots.write().insert(item_id, snapshot);
    }

    /// Number of `fetch_batch` calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl PriceBook for StaticPriceBook {
    fn fetch_batch(&self, _region: &RegionKey, item_ids: &[ItemId]) -> PriceBookResult<SnapshotMap> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let snapshots = self.snapshots.read();
        Ok(item_ids
            .iter()
            .filter_map(|id| snapshots.get(id).map(|s| (*id, s.clone())))
            .collect())
    }
}
