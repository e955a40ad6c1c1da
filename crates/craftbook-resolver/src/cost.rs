//! Cost tree and resolution result types.

use craftbook_core::{ItemId, Price};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Best-known cost of one unit.
///
/// `Unavailable` means no supply path exists (nothing listed and not
/// craftable). It compares as more expensive than any available price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCost {
    Available(Price),
    Unavailable,
}

impl UnitCost {
    /// Cost of buying from the cheapest listing; a missing or zero price has no supply.
    pub fn from_listing(price: Option<Price>) -> Self {
        match price {
            Some(p) if p.is_positive() => Self::Available(p),
            _ => Self::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn price(&self) -> Option<Price> {
        match self {
            Self::Available(p) => Some(*p),
            Self::Unavailable => None,
        }
    }

    /// Price shown in breakdowns; unavailable nodes display as zero.
    pub fn display_price(&self) -> Price {
        self.price().unwrap_or(Price::ZERO)
    }

    /// Strict comparison. Nothing is cheaper than an equal cost, and
    /// `Unavailable` is never cheaper.
    pub fn is_cheaper_than(&self, other: &UnitCost) -> bool {
        match (self, other) {
            (Self::Available(a), Self::Available(b)) => a < b,
            (Self::Available(_), Self::Unavailable) => true,
            (Self::Unavailable, _) => false,
        }
    }
}

impl fmt::Display for UnitCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(p) => write!(f, "{p}"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// How an ingredient is best acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSource {
    Bought,
    Crafted,
}

/// One node of the resolved cost tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostNode {
    pub item_id: ItemId,
    /// Units the parent recipe consumes.
    pub amount: u32,
    pub source: CostSource,
    pub unit_cost: UnitCost,
    /// Ingredient breakdown; non-empty only when `source` is `Crafted`.
    pub children: Vec<CostNode>,
}

impl CostNode {
    pub(crate) fn bought(item_id: ItemId, amount: u32, unit_cost: UnitCost) -> Self {
        Self {
            item_id,
            amount,
            source: CostSource::Bought,
            unit_cost,
            children: Vec::new(),
        }
    }

    /// Shown as out of stock: no listing and no viable craft path.
    pub fn is_out_of_stock(&self) -> bool {
        !self.unit_cost.is_available()
    }

    /// Display subtotal, zero for out-of-stock nodes.
    pub fn subtotal(&self) -> Price {
        self.unit_cost.display_price().times(self.amount)
    }

    /// Levels below this node (0 for a leaf).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Outcome category of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CraftingStatus {
    Success,
    /// Raw good, nothing to craft.
    NoRecipe,
    /// The batch price lookup failed.
    ApiError { code: u16, message: String },
    /// Unexpected internal failure.
    Error { message: String },
}

impl CraftingStatus {
    /// Stable label, matching the serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoRecipe => "no_recipe",
            Self::ApiError { .. } => "api_error",
            Self::Error { .. } => "error",
        }
    }
}

/// Result of `CostResolver::resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingResult {
    pub item_id: ItemId,
    pub status: CraftingStatus,
    /// Total cost of one craft; `Unavailable` when any top-level ingredient is.
    pub total_cost: UnitCost,
    /// Cheapest listing of the product, zero when none.
    pub product_market_price: Price,
    /// `product_market_price - total_cost`, zero unless both are known.
    pub profit: Price,
    /// Top-level ingredients, including unavailable ones.
    pub materials: Vec<CostNode>,
}

impl CraftingResult {
    fn empty(item_id: ItemId, status: CraftingStatus) -> Self {
        Self {
            item_id,
            status,
            total_cost: UnitCost::Unavailable,
            product_market_price: Price::ZERO,
            profit: Price::ZERO,
            materials: Vec::new(),
        }
    }

    pub fn no_recipe(item_id: ItemId) -> Self {
        Self::empty(item_id, CraftingStatus::NoRecipe)
    }

    pub fn api_error(item_id: ItemId, code: u16, message: impl Into<String>) -> Self {
        Self::empty(
            item_id,
            CraftingStatus::ApiError {
                code,
                message: message.into(),
            },
        )
    }

    pub fn error(item_id: ItemId, message: impl Into<String>) -> Self {
        Self::empty(
            item_id,
            CraftingStatus::Error {
                message: message.into(),
            },
        )
    }

    pub(crate) fn success(
        item_id: ItemId,
        total_cost: UnitCost,
        product_market_price: Price,
        materials: Vec<CostNode>,
    ) -> Self {
        let profit = match total_cost {
            UnitCost::Available(cost) if product_market_price.is_positive() => {
                product_market_price - cost
            }
            _ => Price::ZERO,
        };
        Self {
            item_id,
            status: CraftingStatus::Success,
            total_cost,
            product_market_price,
            profit,
            materials,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CraftingStatus::Success
    }

    /// Whether every top-level ingredient has a supply path.
    pub fn is_craftable(&self) -> bool {
        self.is_success() && self.total_cost.is_available()
    }

    /// Total cost as displayed; zero when not craftable.
    pub fn display_total_cost(&self) -> Price {
        self.total_cost.display_price()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn available(v: rust_decimal::Decimal) -> UnitCost {
        UnitCost::Available(Price::new(v))
    }

    #[test]
    fn test_unit_cost_ordering() {
        assert!(available(dec!(70)).is_cheaper_than(&available(dec!(100))));
        assert!(!available(dec!(100)).is_cheaper_than(&available(dec!(100))));
        assert!(available(dec!(1000000)).is_cheaper_than(&UnitCost::Unavailable));
        assert!(!UnitCost::Unavailable.is_cheaper_than(&UnitCost::Unavailable));
        assert!(!UnitCost::Unavailable.is_cheaper_than(&available(dec!(1))));
    }

    #[test]
    fn test_from_listing() {
        assert_eq!(UnitCost::from_listing(None), UnitCost::Unavailable);
        assert_eq!(UnitCost::from_listing(Some(Price::ZERO)), UnitCost::Unavailable);
        assert_eq!(
            UnitCost::from_listing(Some(Price::new(dec!(12)))),
            available(dec!(12))
        );
    }

    #[test]
    fn test_out_of_stock_displays_zero() {
        let node = CostNode::bought(ItemId(9), 3, UnitCost::Unavailable);
        assert!(node.is_out_of_stock());
        assert_eq!(node.subtotal(), Price::ZERO);

        let node = CostNode::bought(ItemId(9), 3, available(dec!(15)));
        assert_eq!(node.subtotal(), Price::new(dec!(45)));
    }

    #[test]
    fn test_profit_requires_known_cost_and_price() {
        let ok = CraftingResult::success(ItemId(1), available(dec!(70)), Price::new(dec!(100)), vec![]);
        assert_eq!(ok.profit, Price::new(dec!(30)));
        assert!(ok.is_craftable());

        let no_cost =
            CraftingResult::success(ItemId(1), UnitCost::Unavailable, Price::new(dec!(100)), vec![]);
        assert_eq!(no_cost.profit, Price::ZERO);
        assert!(!no_cost.is_craftable());
        assert_eq!(no_cost.display_total_cost(), Price::ZERO);

        let no_price = CraftingResult::success(ItemId(1), available(dec!(70)), Price::ZERO, vec![]);
        assert_eq!(no_price.profit, Price::ZERO);
    }

    #[test]
    fn test_status_serialization() {
        let result = CraftingResult::api_error(ItemId(1), 503, "Service Unavailable");
        let json = serde_json::to_value(&result.status).unwrap();
        assert_eq!(json["status"], "api_error");
        assert_eq!(json["code"], 503);
    }
}
