//! Cost resolver implementation.
//!
//! `resolve` runs in two passes over the recipe tree:
//! 1. Collect every reachable item id and fetch all snapshots in one batch.
//! 2. Price each ingredient recursively against that fixed batch, choosing
//!    craft only when it is strictly cheaper than buying.

use crate::cache::NoRecipeCache;
use crate::collect::collect_item_ids;
use crate::config::ResolverConfig;
use crate::cost::{CostNode, CostSource, CraftingResult, UnitCost};
use crate::error::{ResolverError, ResolverResult};
use craftbook_core::{ItemId, Price, PriceBook, Recipe, RecipeGraph, RegionKey, SnapshotMap};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Craft-vs-buy optimizer over a recipe graph.
///
/// Holds the collaborators and the negative cache; each `resolve` call is
/// otherwise independent, so one resolver may serve concurrent callers.
pub struct CostResolver<R, P> {
    recipes: R,
    prices: P,
    config: ResolverConfig,
    no_recipe: Arc<NoRecipeCache>,
}

impl<R: RecipeGraph, P: PriceBook> CostResolver<R, P> {
    /// Create a resolver with its own negative cache.
    pub fn new(recipes: R, prices: P, config: ResolverConfig) -> Self {
        Self::with_cache(recipes, prices, config, Arc::new(NoRecipeCache::new()))
    }

    /// Create a resolver sharing an existing negative cache.
    pub fn with_cache(
        recipes: R,
        prices: P,
        config: ResolverConfig,
        no_recipe: Arc<NoRecipeCache>,
    ) -> Self {
        Self {
            recipes,
            prices,
            config,
            no_recipe,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn no_recipe_cache(&self) -> &Arc<NoRecipeCache> {
        &self.no_recipe
    }

    /// Cheapest way to craft `item_id` with prices from `region`.
    ///
    /// Never panics on collaborator failures; the outcome is reported in
    /// `CraftingResult::status`.
    pub fn resolve(&self, item_id: ItemId, region: &RegionKey) -> CraftingResult {
        if self.no_recipe.contains(item_id) {
            debug!(%item_id, "Known raw item, skipping recipe lookup");
            return CraftingResult::no_recipe(item_id);
        }

        let Some(recipe) = self.recipes.get_recipe(item_id) else {
            self.no_recipe.insert(item_id);
            debug!(%item_id, "No recipe, cached as raw item");
            return CraftingResult::no_recipe(item_id);
        };

        match self.resolve_recipe(&recipe, region) {
            Ok(result) => result,
            Err(e) => {
                error!(%item_id, %region, error = %e, "Cost resolution failed");
                CraftingResult::error(item_id, e.to_string())
            }
        }
    }

    fn resolve_recipe(&self, recipe: &Recipe, region: &RegionKey) -> ResolverResult<CraftingResult> {
        let root = recipe.result_item_id;
        recipe.validate()?;

        let ids = collect_item_ids(&self.recipes, root, self.config.max_depth);
        info!(%root, %region, item_count = ids.len(), "Fetching market data for recipe tree");

        let snapshots = match self.prices.fetch_batch(region, &ids) {
            Ok(snapshots) => snapshots,
            Err(e) => {
                warn!(%root, %region, status = e.status, message = %e.message, "Batch price lookup failed");
                return Ok(CraftingResult::api_error(root, e.status, e.message));
            }
        };
        for snapshot in snapshots.values() {
            snapshot.validate()?;
        }

        let mut pass = CostPass::new(&self.recipes, &snapshots, self.config.max_depth);
        let mut total = Price::ZERO;
        let mut craftable = true;
        let mut materials = Vec::with_capacity(recipe.ingredients.len());

        for ingredient in &recipe.ingredients {
            // Each top-level ingredient starts a fresh path.
            let mut path = Vec::with_capacity(self.config.max_depth);
            let evaluated = pass.evaluate(ingredient.item_id, ingredient.amount, 0, &mut path)?;

            match evaluated.node.unit_cost.price() {
                Some(unit) => {
                    total = unit
                        .checked_times(ingredient.amount)
                        .and_then(|line| total.checked_add(line))
                        .ok_or(ResolverError::Overflow(root))?;
                }
                None => craftable = false,
            }
            materials.push(evaluated.node);
        }

        let total_cost = if craftable {
            UnitCost::Available(total)
        } else {
            UnitCost::Unavailable
        };
        let product_price = snapshots
            .get(&root)
            .and_then(|s| s.min_listing_price())
            .unwrap_or(Price::ZERO);

        info!(
            %root,
            total_cost = %total_cost,
            product_price = %product_price,
            memoized = pass.memo.len(),
            "Recipe resolved"
        );

        Ok(CraftingResult::success(root, total_cost, product_price, materials))
    }
}

/// A memoized node and how many levels below it were explored.
struct Memo {
    node: CostNode,
    height: usize,
}

struct Evaluated {
    node: CostNode,
    height: usize,
    /// Hit a cycle or the depth ceiling somewhere below; result is path dependent.
    truncated: bool,
}

struct CraftCost {
    cost: UnitCost,
    children: Vec<CostNode>,
    height: usize,
    truncated: bool,
}

/// One pricing pass against a fixed batch of snapshots.
struct CostPass<'a, R: ?Sized> {
    recipes: &'a R,
    snapshots: &'a SnapshotMap,
    max_depth: usize,
    memo: HashMap<ItemId, Memo>,
}

impl<'a, R: RecipeGraph + ?Sized> CostPass<'a, R> {
    fn new(recipes: &'a R, snapshots: &'a SnapshotMap, max_depth: usize) -> Self {
        Self {
            recipes,
            snapshots,
            max_depth,
            memo: HashMap::new(),
        }
    }

    fn buy_cost(&self, item_id: ItemId) -> UnitCost {
        UnitCost::from_listing(
            self.snapshots
                .get(&item_id)
                .and_then(|s| s.min_listing_price()),
        )
    }

    /// Cheapest acquisition of `item_id` at `depth`, with `path` holding the
    /// ancestors on the current branch.
    fn evaluate(
        &mut self,
        item_id: ItemId,
        amount: u32,
        depth: usize,
        path: &mut Vec<ItemId>,
    ) -> ResolverResult<Evaluated> {
        if depth >= self.max_depth || path.contains(&item_id) {
            debug!(%item_id, depth, "Cycle or depth ceiling, pricing as buy-only");
            return Ok(Evaluated {
                node: CostNode::bought(item_id, amount, self.buy_cost(item_id)),
                height: 0,
                truncated: true,
            });
        }

        // A memoized subtree contains no cycle, so it is valid on any path
        // as long as it still fits under the depth ceiling.
        if let Some(memo) = self.memo.get(&item_id) {
            if depth + memo.height < self.max_depth {
                let mut node = memo.node.clone();
                node.amount = amount;
                return Ok(Evaluated {
                    node,
                    height: memo.height,
                    truncated: false,
                });
            }
        }

        let buy_cost = self.buy_cost(item_id);
        let Some(recipe) = self.recipes.get_recipe(item_id) else {
            let node = CostNode::bought(item_id, amount, buy_cost);
            self.remember(&node, 0);
            return Ok(Evaluated {
                node,
                height: 0,
                truncated: false,
            });
        };
        recipe.validate()?;

        path.push(item_id);
        let craft = self.craft_cost(&recipe, depth, path);
        path.pop();
        let craft = craft?;

        let node = if craft.cost.is_cheaper_than(&buy_cost) {
            CostNode {
                item_id,
                amount,
                source: CostSource::Crafted,
                unit_cost: craft.cost,
                children: craft.children,
            }
        } else {
            CostNode::bought(item_id, amount, buy_cost)
        };
        debug!(
            %item_id,
            depth,
            buy = %buy_cost,
            craft = %craft.cost,
            source = ?node.source,
            "Ingredient priced"
        );

        if !craft.truncated {
            self.remember(&node, craft.height);
        }
        Ok(Evaluated {
            node,
            height: craft.height,
            truncated: craft.truncated,
        })
    }

    fn craft_cost(
        &mut self,
        recipe: &Recipe,
        depth: usize,
        path: &mut Vec<ItemId>,
    ) -> ResolverResult<CraftCost> {
        let mut total = Price::ZERO;
        let mut children = Vec::with_capacity(recipe.ingredients.len());
        let mut height = 0;
        let mut truncated = false;

        for ingredient in &recipe.ingredients {
            let child = self.evaluate(ingredient.item_id, ingredient.amount, depth + 1, path)?;
            height = height.max(child.height + 1);
            truncated |= child.truncated;

            let Some(unit) = child.node.unit_cost.price() else {
                return Ok(CraftCost {
                    cost: UnitCost::Unavailable,
                    children: Vec::new(),
                    height,
                    truncated,
                });
            };
            total = unit
                .checked_times(ingredient.amount)
                .and_then(|line| total.checked_add(line))
                .ok_or(ResolverError::Overflow(recipe.result_item_id))?;
            children.push(child.node);
        }

        Ok(CraftCost {
            cost: UnitCost::Available(total),
            children,
            height,
            truncated,
        })
    }

    fn remember(&mut self, node: &CostNode, height: usize) {
        self.memo.insert(
            node.item_id,
            Memo {
                node: node.clone(),
                height,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CraftingStatus;
    use craftbook_core::{Ingredient, Listing, MarketSnapshot, PriceBookResult};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recipes {
        recipes: HashMap<ItemId, Recipe>,
        lookups: AtomicUsize,
    }

    impl Recipes {
        fn with(mut self, result: u32, inputs: &[(u32, u32)]) -> Self {
            let ingredients = inputs
                .iter()
                .map(|(id, amount)| Ingredient::new(ItemId(*id), *amount))
                .collect();
            self.recipes
                .insert(ItemId(result), Recipe::new(ItemId(result), 1, ingredients));
            self
        }
    }

    impl RecipeGraph for Recipes {
        fn get_recipe(&self, item_id: ItemId) -> Option<Recipe> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.recipes.get(&item_id).cloned()
        }
    }

    #[derive(Default)]
    struct Prices(SnapshotMap);

    impl Prices {
        fn with(mut self, item: u32, price: Decimal) -> Self {
            self.0.insert(
                ItemId(item),
                MarketSnapshot::new(vec![Listing::new(Price::new(price), 1, "Ramuh")], vec![]),
            );
            self
        }
    }

    impl PriceBook for Prices {
        fn fetch_batch(&self, _: &RegionKey, ids: &[ItemId]) -> PriceBookResult<SnapshotMap> {
            Ok(ids
                .iter()
                .filter_map(|id| self.0.get(id).map(|s| (*id, s.clone())))
                .collect())
        }
    }

    fn region() -> RegionKey {
        RegionKey::from("Japan")
    }

    fn available(v: Decimal) -> UnitCost {
        UnitCost::Available(Price::new(v))
    }

    #[test]
    fn test_shared_subtree_is_memoized() {
        // 2 and 3 both need intermediate 4, which is crafted from 5.
        let recipes = Recipes::default()
            .with(1, &[(2, 1), (3, 1)])
            .with(2, &[(4, 2)])
            .with(3, &[(4, 1)])
            .with(4, &[(5, 1)]);
        let prices = Prices::default()
            .with(2, dec!(1000))
            .with(3, dec!(1000))
            .with(4, dec!(100))
            .with(5, dec!(10));
        let resolver = CostResolver::new(recipes, prices, ResolverConfig::default());

        let result = resolver.resolve(ItemId(1), &region());
        assert!(result.is_success());
        assert_eq!(result.total_cost, available(dec!(30)));
        // Reused node keeps the amount its own parent asks for.
        assert_eq!(result.materials[0].children[0].amount, 2);
        assert_eq!(result.materials[1].children[0].amount, 1);
        assert_eq!(result.materials[1].children[0].unit_cost, available(dec!(10)));
    }

    #[test]
    fn test_memo_respects_depth_ceiling() {
        // Direct: 4 (d0) -> 5 (d1) -> 7 (d2), so 4 crafts for 1.
        // Deep:   3 (d0) -> 6 -> 8 -> 4 (d3) -> 5 (d4, cut). 5 has no listing,
        //         so 4 must fall back to its listing there.
        let recipes = Recipes::default()
            .with(1, &[(4, 1), (3, 1)])
            .with(4, &[(5, 1)])
            .with(5, &[(7, 1)])
            .with(3, &[(6, 1)])
            .with(6, &[(8, 1)])
            .with(8, &[(4, 1)]);
        let prices = Prices::default()
            .with(4, dec!(100))
            .with(7, dec!(1))
            .with(3, dec!(1000))
            .with(6, dec!(1000))
            .with(8, dec!(1000));
        let resolver = CostResolver::new(recipes, prices, ResolverConfig { max_depth: 4 });

        let result = resolver.resolve(ItemId(1), &region());
        let direct = &result.materials[0];
        assert_eq!(direct.source, CostSource::Crafted);
        assert_eq!(direct.unit_cost, available(dec!(1)));

        let deep = &result.materials[1].children[0].children[0].children[0];
        assert_eq!(deep.item_id, ItemId(4));
        assert_eq!(deep.source, CostSource::Bought);
        assert_eq!(deep.unit_cost, available(dec!(100)));
        assert_eq!(result.total_cost, available(dec!(101)));
    }

    #[test]
    fn test_zero_amount_reports_error() {
        let recipes = Recipes::default().with(1, &[(2, 0)]);
        let resolver = CostResolver::new(recipes, Prices::default(), ResolverConfig::default());

        let result = resolver.resolve(ItemId(1), &region());
        assert!(matches!(result.status, CraftingStatus::Error { .. }));
    }

    #[test]
    fn test_negative_price_reports_error() {
        let recipes = Recipes::default().with(1, &[(2, 1)]);
        let prices = Prices::default().with(2, dec!(-5));
        let resolver = CostResolver::new(recipes, prices, ResolverConfig::default());

        let result = resolver.resolve(ItemId(1), &region());
        assert!(matches!(result.status, CraftingStatus::Error { .. }));
    }

    #[test]
    fn test_no_recipe_is_cached() {
        let resolver =
            CostResolver::new(Recipes::default(), Prices::default(), ResolverConfig::default());

        assert_eq!(
            resolver.resolve(ItemId(42), &region()),
            CraftingResult::no_recipe(ItemId(42))
        );
        assert_eq!(resolver.recipes.lookups.load(Ordering::SeqCst), 1);

        resolver.resolve(ItemId(42), &region());
        assert_eq!(resolver.recipes.lookups.load(Ordering::SeqCst), 1);
        assert!(resolver.no_recipe_cache().contains(ItemId(42)));
    }

    #[test]
    fn test_product_price_and_profit() {
        let recipes = Recipes::default().with(1, &[(2, 3)]);
        let prices = Prices::default().with(1, dec!(500)).with(2, dec!(100));
        let resolver = CostResolver::new(recipes, prices, ResolverConfig::default());

        let result = resolver.resolve(ItemId(1), &region());
        assert_eq!(result.total_cost, available(dec!(300)));
        assert_eq!(result.product_market_price, Price::new(dec!(500)));
        assert_eq!(result.profit, Price::new(dec!(200)));
    }
}
