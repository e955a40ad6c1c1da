//! HTTP client for the market board API.
//!
//! Fetches listings and sale history in id chunks, retries transient
//! failures, and keeps recently fetched snapshots in a per-item TTL cache.

use crate::config::MarketClientConfig;
use crate::dto::{BatchResponseDto, RecentlyUpdatedDto};
use crate::error::{RegistryError, RegistryResult};
use craftbook_core::{ItemId, MarketSnapshot, RegionKey, SnapshotMap};
use craftbook_telemetry::Metrics;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: MarketSnapshot,
    fetched_at: Instant,
}

/// Client for the market board API.
pub struct MarketClient {
    client: Client,
    config: MarketClientConfig,
    /// Keyed by `region:item`.
    cache: DashMap<String, CachedSnapshot>,
}

fn cache_key(region: &RegionKey, item_id: ItemId) -> String {
    format!("{region}:{item_id}")
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 500 | 502 | 503 | 504)
}

impl MarketClient {
    pub fn new(config: MarketClientConfig) -> RegistryResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            cache: DashMap::new(),
        })
    }

    pub fn config(&self) -> &MarketClientConfig {
        &self.config
    }

    /// Snapshots for `item_ids` in `region`.
    ///
    /// Cached entries younger than the TTL are served without a request. The
    /// rest is fetched in chunks of `batch_size`; a chunk that still fails
    /// after retries fails the whole call. Items the API does not know are
    /// absent from the result.
    pub async fn fetch_batch(
        &self,
        region: &RegionKey,
        item_ids: &[ItemId],
    ) -> RegistryResult<SnapshotMap> {
        let mut result = SnapshotMap::with_capacity(item_ids.len());
        if item_ids.is_empty() {
            return Ok(result);
        }

        let mut missing = Vec::new();
        for &item_id in item_ids {
            if result.contains_key(&item_id) || missing.contains(&item_id) {
                continue;
            }
            match self.cached(region, item_id) {
                Some(snapshot) => {
                    Metrics::price_cache_hit();
                    result.insert(item_id, snapshot);
                }
                None => {
                    Metrics::price_cache_miss();
                    missing.push(item_id);
                }
            }
        }

        if missing.is_empty() {
            debug!(%region, items = item_ids.len(), "All snapshots served from cache");
            return Ok(result);
        }

        let chunk_count = missing.len().div_ceil(self.config.batch_size);
        for (index, chunk) in missing.chunks(self.config.batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.batch_pause()).await;
            }
            info!(
                %region,
                chunk = index + 1,
                chunks = chunk_count,
                ids = chunk.len(),
                "Fetching market batch"
            );

            for (item_id, snapshot) in self.fetch_chunk(region, chunk).await? {
                self.cache.insert(
                    cache_key(region, item_id),
                    CachedSnapshot {
                        snapshot: snapshot.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                result.insert(item_id, snapshot);
            }
        }

        Ok(result)
    }

    /// Ids of items with the most recent market uploads in `region`.
    pub async fn fetch_recently_updated(
        &self,
        region: &RegionKey,
        entries: usize,
    ) -> RegistryResult<Vec<ItemId>> {
        let url = format!(
            "{}/extra/stats/most-recently-updated?world={}&entries={}",
            self.base_url(),
            region,
            entries
        );
        info!(%region, entries, "Fetching recently updated items");

        let body = self.get_with_retry(&url).await?;
        let response: RecentlyUpdatedDto = serde_json::from_str(&body).map_err(|e| {
            Metrics::price_request("parse_error");
            RegistryError::Parse(format!("recently updated response: {e}"))
        })?;

        let ids: Vec<ItemId> = response.items.iter().filter_map(|e| e.item_id()).collect();
        debug!(%region, count = ids.len(), "Recently updated items parsed");
        Ok(ids)
    }

    /// Drop expired cache entries. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let ttl = self.config.cache_ttl();
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        before - self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn cached(&self, region: &RegionKey, item_id: ItemId) -> Option<MarketSnapshot> {
        let entry = self.cache.get(&cache_key(region, item_id))?;
        if entry.fetched_at.elapsed() < self.config.cache_ttl() {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn fetch_chunk(
        &self,
        region: &RegionKey,
        chunk: &[ItemId],
    ) -> RegistryResult<Vec<(ItemId, MarketSnapshot)>> {
        let ids = chunk
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/{}/{}?entries={}",
            self.base_url(),
            region,
            ids,
            self.config.history_entries
        );

        let body = self.get_with_retry(&url).await?;
        let response: BatchResponseDto = serde_json::from_str(&body).map_err(|e| {
            Metrics::price_request("parse_error");
            RegistryError::Parse(format!("market batch response: {e}"))
        })?;

        Ok(response
            .into_items()
            .into_iter()
            .map(|item| item.into_snapshot(region))
            .collect())
    }

    /// GET `url`, retrying 5xx responses and transport errors with linear backoff.
    async fn get_with_retry(&self, url: &str) -> RegistryResult<String> {
        let mut attempt = 0u32;

        loop {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(|e| {
                            Metrics::price_request("transport_error");
                            RegistryError::HttpClient(format!("Failed to read response: {e}"))
                        })?;
                        Metrics::price_request("ok");
                        return Ok(body);
                    }

                    let body = response.text().await.unwrap_or_default();
                    if is_retryable(status) && attempt < self.config.max_retries {
                        attempt += 1;
                        warn!(url, %status, attempt, "Retrying market request");
                        Metrics::http_retry(status.as_str());
                        tokio::time::sleep(self.config.backoff(attempt)).await;
                        continue;
                    }

                    warn!(url, %status, "Market request failed");
                    Metrics::price_request("http_error");
                    return Err(RegistryError::HttpStatus {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    if attempt < self.config.max_retries {
                        attempt += 1;
                        warn!(url, error = %e, attempt, "Retrying market request after transport error");
                        Metrics::http_retry("transport");
                        tokio::time::sleep(self.config.backoff(attempt)).await;
                        continue;
                    }

                    Metrics::price_request("transport_error");
                    return Err(RegistryError::HttpClient(format!("HTTP request failed: {e}")));
                }
            }
        }
    }
}
