//! Market board data: active listings and completed sales.
//!
//! A `MarketSnapshot` is the read-only view both engines consume. Listings
//! are kept ascending by unit price; `MarketSnapshot::new` re-sorts whatever
//! order the source delivered.

use crate::error::{CoreError, Result};
use crate::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An active sell order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Asking price per unit.
    pub unit_price: Price,
    /// Units in the stack.
    pub quantity: u32,
    /// World / region the listing is posted on.
    pub region: String,
    /// High-quality variant.
    pub hq: bool,
    /// Last time the listing was seen by an uploader.
    pub last_review_time: DateTime<Utc>,
    /// Seller (retainer) label.
    pub seller: String,
}

impl Listing {
    /// Create a normal-quality listing reviewed now.
    pub fn new(unit_price: Price, quantity: u32, region: impl Into<String>) -> Self {
        Self {
            unit_price,
            quantity,
            region: region.into(),
            hq: false,
            last_review_time: Utc::now(),
            seller: String::new(),
        }
    }

    pub fn with_hq(mut self, hq: bool) -> Self {
        self.hq = hq;
        self
    }

    pub fn reviewed_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_review_time = at;
        self
    }

    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = seller.into();
        self
    }

    /// Total asking price of the stack.
    pub fn stack_cost(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A completed historical trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Price paid per unit.
    pub unit_price: Price,
    /// Units sold.
    pub quantity: u32,
    /// High-quality variant.
    pub hq: bool,
    /// Time of sale.
    pub timestamp: DateTime<Utc>,
}

impl SaleRecord {
    pub fn new(unit_price: Price, quantity: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            unit_price,
            quantity,
            hq: false,
            timestamp,
        }
    }

    pub fn with_hq(mut self, hq: bool) -> Self {
        self.hq = hq;
        self
    }
}

/// Listings and sale history for one item in one market scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Active listings, ascending by unit price.
    pub listings: Vec<Listing>,
    /// Recent sales, in source order.
    pub history: Vec<SaleRecord>,
}

impl MarketSnapshot {
    /// Create a snapshot, sorting listings ascending by unit price.
    pub fn new(mut listings: Vec<Listing>, history: Vec<SaleRecord>) -> Self {
        listings.sort_by(|a, b| a.unit_price.cmp(&b.unit_price));
        Self { listings, history }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty() && self.history.is_empty()
    }

    /// Cheapest asking price, `None` when nothing is listed.
    pub fn min_listing_price(&self) -> Option<Price> {
        self.listings.iter().map(|l| l.unit_price).min()
    }

    /// Reject negative prices.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.listings.iter().find(|l| l.unit_price.is_negative()) {
            return Err(CoreError::InvalidPrice(format!(
                "listing on {} priced {}",
                bad.region, bad.unit_price
            )));
        }
        if let Some(bad) = self.history.iter().find(|h| h.unit_price.is_negative()) {
            return Err(CoreError::InvalidPrice(format!(
                "sale at {} priced {}",
                bad.timestamp, bad.unit_price
            )));
        }
        Ok(())
    }
}
