//! Hot-item screening across many items.

use crate::engine::window_start;
use chrono::{DateTime, Duration, Utc};
use craftbook_core::{ItemId, MarketSnapshot, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Items whose cheapest listing is below this are junk for screening.
pub const DEFAULT_MIN_PRICE_THRESHOLD: Decimal = Decimal::from_parts(300, 0, 0, false, 0);

/// One ranked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotItem {
    pub item_id: ItemId,
    /// Units per day for windows of a day or more, else units in the window.
    pub heat: Decimal,
    /// Units sold in the window.
    pub sold: u64,
    /// Trades in the window.
    pub tx_count: usize,
    /// Mean listing price, rounded down.
    pub avg_listing_price: Price,
    pub min_price: Price,
    /// Number of listings.
    pub stock: usize,
}

/// Rank `snapshots` by recent sales, hottest first.
///
/// Items with no listings, a cheapest listing under `min_price_threshold`,
/// or no sales in the last `window_hours` are dropped.
pub fn screen_hot_items<'a>(
    snapshots: impl IntoIterator<Item = (&'a ItemId, &'a MarketSnapshot)>,
    window_hours: u32,
    min_price_threshold: Price,
    now: DateTime<Utc>,
) -> Vec<HotItem> {
    let cutoff = window_start(now, Duration::hours(i64::from(window_hours)));
    let mut ranked = Vec::new();

    for (&item_id, snapshot) in snapshots {
        let Some(min_price) = snapshot.min_listing_price() else {
            continue;
        };
        if min_price < min_price_threshold {
            continue;
        }

        let sold: u64 = snapshot
            .history
            .iter()
            .filter(|h| h.unit_price.is_positive() && h.timestamp > cutoff)
            .map(|h| u64::from(h.quantity))
            .sum();
        if sold == 0 {
            continue;
        }

        let heat = if window_hours >= 24 {
            Decimal::from(sold) / (Decimal::from(window_hours) / Decimal::from(24))
        } else {
            Decimal::from(sold)
        };
        let tx_count = snapshot
            .history
            .iter()
            .filter(|h| h.timestamp > cutoff)
            .count();
        let stock = snapshot.listings.len();
        let listed_total: Decimal = snapshot.listings.iter().map(|l| l.unit_price.inner()).sum();
        let avg_listing_price = Price::new((listed_total / Decimal::from(stock)).floor());

        ranked.push(HotItem {
            item_id,
            heat,
            sold,
            tx_count,
            avg_listing_price,
            min_price,
            stock,
        });
    }

    ranked.sort_by(|a, b| {
        b.heat
            .cmp(&a.heat)
            .then(b.tx_count.cmp(&a.tx_count))
            .then(a.item_id.cmp(&b.item_id))
    });
    debug!(window_hours, hot = ranked.len(), "Hot items screened");
    ranked
}
