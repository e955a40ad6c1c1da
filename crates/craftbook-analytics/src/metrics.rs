//! Market metrics output.

use craftbook_core::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where `MarketMetrics::average_price` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragePriceType {
    /// Recent sales inside the averaging window.
    Normal,
    /// A handful of sales of any age.
    Old,
    /// The cheapest current listings; no usable sales.
    Estimated,
    /// Nothing to average.
    None,
}

impl AveragePriceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Old => "old",
            Self::Estimated => "estimated",
            Self::None => "none",
        }
    }
}

impl fmt::Display for AveragePriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sale batch size and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackPopularity {
    pub quantity: u32,
    pub frequency: usize,
}

/// Trading statistics for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetrics {
    /// Units sold per day over the velocity window.
    pub velocity: Decimal,
    /// Trades per day over the velocity window.
    pub transaction_velocity: Decimal,
    pub average_price: Price,
    pub average_price_type: AveragePriceType,
    /// Cheapest listing, zero when nothing is listed.
    pub min_price: Price,
    /// Units listed within 1.5x of the cheapest price.
    pub effective_stock: u64,
    pub total_raw_stock: u64,
    /// `effective_stock / velocity`, or `DAYS_TO_SELL_UNBOUNDED` without sales.
    pub days_to_sell: Decimal,
    /// What selling one unit at `min_price` brings in after tax.
    pub expected_unit_revenue: Price,
    /// Buy at `min_price`, sell at `average_price` after tax.
    pub flip_profit: Price,
    /// `flip_profit / min_price` in percent.
    pub roi: Decimal,
    pub arbitrage_spread: Price,
    /// The cheapest region's data is older than velocity warrants.
    pub arbitrage_warning: bool,
    /// Total profit of the snipe, zero when none qualifies.
    pub snipe_profit: Price,
    /// Outlay for the cheapest stack, zero when no snipe qualifies.
    pub snipe_cost: Price,
    /// Up to three most common sale sizes.
    pub stack_popularity: Vec<StackPopularity>,
}

impl MarketMetrics {
    /// Metrics for an item with no listings and no sales.
    pub fn empty() -> Self {
        Self {
            velocity: Decimal::ZERO,
            transaction_velocity: Decimal::ZERO,
            average_price: Price::ZERO,
            average_price_type: AveragePriceType::None,
            min_price: Price::ZERO,
            effective_stock: 0,
            total_raw_stock: 0,
            days_to_sell: crate::engine::DAYS_TO_SELL_UNBOUNDED,
            expected_unit_revenue: Price::ZERO,
            flip_profit: Price::ZERO,
            roi: Decimal::ZERO,
            arbitrage_spread: Price::ZERO,
            arbitrage_warning: false,
            snipe_profit: Price::ZERO,
            snipe_cost: Price::ZERO,
            stack_popularity: Vec::new(),
        }
    }

    pub fn has_snipe(&self) -> bool {
        self.snipe_profit.is_positive()
    }
}
