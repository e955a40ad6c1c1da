//! Market data and recipe collaborators for craftbook.
//!
//! - `MarketClient`: batched market board client with retry and a TTL cache
//! - `BlockingPriceBook` / `StaticPriceBook`: `PriceBook` implementations
//! - `RecipeBook`: in-memory `RecipeGraph` loaded from recipe JSON

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod price_book;
pub mod recipe_book;

pub use client::MarketClient;
pub use config::MarketClientConfig;
pub use error::{RegistryError, RegistryResult};
pub use price_book::{BlockingPriceBook, StaticPriceBook};
pub use recipe_book::RecipeBook;
