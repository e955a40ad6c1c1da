//! Market board wire format.
//!
//! The batch endpoint answers with an `items` map for multi-id requests and
//! with a bare item object when exactly one id was requested.

use chrono::{DateTime, Utc};
use craftbook_core::{ItemId, Listing, MarketSnapshot, Price, RegionKey, SaleRecord};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Unix timestamps above this are milliseconds.
const MILLIS_THRESHOLD: i64 = 2_000_000_000;

/// Raw listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingDto {
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: i64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub hq: bool,
    #[serde(rename = "worldName", default)]
    pub world_name: Option<String>,
    #[serde(rename = "lastReviewTime", default)]
    pub last_review_time: i64,
    #[serde(rename = "retainerName", default)]
    pub retainer_name: Option<String>,
}

/// Raw sale history entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleDto {
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: i64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub hq: bool,
    #[serde(default)]
    pub timestamp: i64,
}

/// Market data for one item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemMarketDto {
    #[serde(rename = "itemID")]
    pub item_id: u32,
    /// Present when the request targeted a single world.
    #[serde(rename = "worldName", default)]
    pub world_name: Option<String>,
    #[serde(default)]
    pub listings: Vec<ListingDto>,
    #[serde(rename = "recentHistory", default)]
    pub recent_history: Vec<SaleDto>,
}

/// Either response shape of the batch endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BatchResponseDto {
    Multi { items: HashMap<String, ItemMarketDto> },
    Single(ItemMarketDto),
}

impl BatchResponseDto {
    pub fn into_items(self) -> Vec<ItemMarketDto> {
        match self {
            Self::Multi { items } => items.into_values().collect(),
            Self::Single(item) => vec![item],
        }
    }
}

/// Entry of the recently-updated listing; older API versions return bare ids.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecentEntryDto {
    Id(u32),
    Object {
        #[serde(rename = "itemID", default)]
        item_id: Option<u32>,
    },
}

impl RecentEntryDto {
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Id(id) => Some(ItemId(*id)),
            Self::Object { item_id } => item_id.filter(|id| *id > 0).map(ItemId),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentlyUpdatedDto {
    #[serde(default)]
    pub items: Vec<RecentEntryDto>,
}

/// Seconds or milliseconds since the epoch, whichever `raw` looks like.
pub fn unix_to_datetime(raw: i64) -> DateTime<Utc> {
    let parsed = if raw > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    };
    parsed.unwrap_or_default()
}

impl ItemMarketDto {
    /// Convert to the core snapshot. Listings without a world name are
    /// attributed to the world in the payload, else to `region`.
    pub fn into_snapshot(self, region: &RegionKey) -> (ItemId, MarketSnapshot) {
        let fallback_world = self
            .world_name
            .clone()
            .unwrap_or_else(|| region.as_str().to_string());

        let listings = self
            .listings
            .into_iter()
            .map(|l| {
                let world = l.world_name.unwrap_or_else(|| fallback_world.clone());
                Listing::new(Price::new(Decimal::from(l.price_per_unit)), l.quantity, world)
                    .with_hq(l.hq)
                    .reviewed_at(unix_to_datetime(l.last_review_time))
                    .with_seller(l.retainer_name.unwrap_or_default())
            })
            .collect();

        let history = self
            .recent_history
            .into_iter()
            .map(|s| {
                SaleRecord::new(
                    Price::new(Decimal::from(s.price_per_unit)),
                    s.quantity,
                    unix_to_datetime(s.timestamp),
                )
                .with_hq(s.hq)
            })
            .collect();

        (ItemId(self.item_id), MarketSnapshot::new(listings, history))
    }
}
