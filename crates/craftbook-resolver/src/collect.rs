//! Recipe tree id collection.

use craftbook_core::{ItemId, RecipeGraph};
use std::collections::HashSet;

/// Every distinct item id reachable from `root` within `max_depth` levels.
///
/// Preorder depth-first walk with an explicit stack. An id is expanded at most
/// once; nodes at depth `max_depth` or deeper are not collected. The root is
/// always first.
pub fn collect_item_ids<R>(recipes: &R, root: ItemId, max_depth: usize) -> Vec<ItemId>
where
    R: RecipeGraph + ?Sized,
{
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((item_id, depth)) = stack.pop() {
        if depth >= max_depth || !visited.insert(item_id) {
            continue;
        }
        order.push(item_id);

        if let Some(recipe) = recipes.get_recipe(item_id) {
            // Reverse so the first ingredient is expanded first.
            for ingredient in recipe.ingredients.iter().rev() {
                stack.push((ingredient.item_id, depth + 1));
            }
        }
    }

    order
}
