//! Core value types for craftbook.
//!
//! This crate provides the types shared by the cost resolver and the
//! market metrics engine:
//! - `ItemId`, `RegionKey`: identifiers for goods and market scopes
//! - `Price`: exact decimal money amount
//! - `Listing`, `SaleRecord`, `MarketSnapshot`: market board data
//! - `Recipe`, `Ingredient`: crafting graph nodes
//! - `RecipeGraph`, `PriceBook`: collaborator interfaces the engines consume

pub mod decimal;
pub mod error;
pub mod item;
pub mod market;
pub mod provider;
pub mod recipe;

pub use decimal::Price;
pub use error::{CoreError, Result};
pub use item::{ItemId, RegionKey};
pub use market::{Listing, MarketSnapshot, SaleRecord};
pub use provider::{PriceBook, PriceBookError, PriceBookResult, RecipeGraph, SnapshotMap};
pub use recipe::{Ingredient, Recipe};
