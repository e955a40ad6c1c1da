//! Negative cache of items without a recipe.
//!
//! Shared by every resolution a `CostResolver` runs; concurrent resolutions
//! may insert and look up at the same time.

use craftbook_core::ItemId;
use dashmap::DashSet;

/// Items the recipe graph reported as raw goods.
#[derive(Debug, Default)]
pub struct NoRecipeCache {
    items: DashSet<ItemId>,
}

impl NoRecipeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.items.contains(&item_id)
    }

    /// Remember `item_id`. Returns true if it was not cached before.
    pub fn insert(&self, item_id: ItemId) -> bool {
        self.items.insert(item_id)
    }

    /// Forget one item, e.g. after the recipe data was refreshed.
    pub fn remove(&self, item_id: ItemId) -> bool {
        self.items.remove(&item_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_and_remove() {
        let cache = NoRecipeCache::new();
        assert!(cache.insert(ItemId(5)));
        assert!(!cache.insert(ItemId(5)));
        assert!(cache.contains(ItemId(5)));
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(ItemId(5)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = Arc::new(NoRecipeCache::new());
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100u32 {
                        cache.insert(ItemId(i % 50 + t * 1000));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 200);
    }
}
