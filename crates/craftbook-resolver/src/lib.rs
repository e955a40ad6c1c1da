//! Craft-vs-buy cost resolver.
//!
//! Walks a recipe tree, fetches market prices for every node in one batch,
//! and decides bottom-up whether each ingredient is cheaper to buy or to
//! craft from its own ingredients.
//!
//! - Depth is capped (`ResolverConfig::max_depth`) and each path carries its
//!   own visited list, so cyclic recipe graphs always terminate.
//! - Results for a node are memoized per resolution when they did not depend
//!   on a cycle or depth cut.
//! - Items known to have no recipe are remembered in a shared `NoRecipeCache`.

pub mod cache;
pub mod collect;
pub mod config;
pub mod cost;
pub mod error;
pub mod resolver;

pub use cache::NoRecipeCache;
pub use collect::collect_item_ids;
pub use config::{ResolverConfig, DEFAULT_MAX_DEPTH};
pub use cost::{CostNode, CostSource, CraftingResult, CraftingStatus, UnitCost};
pub use error::{ResolverError, ResolverResult};
pub use resolver::CostResolver;
