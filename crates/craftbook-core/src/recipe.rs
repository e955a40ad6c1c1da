//! Crafting recipes.

use crate::error::{CoreError, Result};
use crate::ItemId;
use serde::{Deserialize, Serialize};

/// One input of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub item_id: ItemId,
    /// Units consumed per craft, at least 1.
    pub amount: u32,
}

impl Ingredient {
    pub fn new(item_id: ItemId, amount: u32) -> Self {
        Self { item_id, amount }
    }
}

/// The single recipe exposed for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub result_item_id: ItemId,
    /// Units produced per craft.
    pub yield_amount: u32,
    /// Ingredients in recipe order.
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(result_item_id: ItemId, yield_amount: u32, ingredients: Vec<Ingredient>) -> Self {
        Self {
            result_item_id,
            yield_amount,
            ingredients,
        }
    }

    /// Check the amount invariants.
    ///
    /// A direct self-reference is not rejected here; the resolver treats it
    /// as a cycle.
    pub fn validate(&self) -> Result<()> {
        if self.yield_amount == 0 {
            return Err(CoreError::InvalidRecipe(format!(
                "recipe for {} yields 0 units",
                self.result_item_id
            )));
        }
        if let Some(bad) = self.ingredients.iter().find(|i| i.amount == 0) {
            return Err(CoreError::InvalidQuantity(format!(
                "ingredient {} of {} has amount 0",
                bad.item_id, self.result_item_id
            )));
        }
        Ok(())
    }
}
