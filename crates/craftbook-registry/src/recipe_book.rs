//! In-memory recipe graph.
//!
//! Recipe data is a JSON array of records shaped like
//! `{ "id": 1, "result": 5057, "yields": 1, "ingredients": [{ "id": 5, "amount": 2 }] }`.
//! Extra fields are ignored. When several recipes produce the same item the
//! first one in the file wins.

use crate::error::{RegistryError, RegistryResult};
use craftbook_core::{Ingredient, ItemId, Recipe, RecipeGraph};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    id: u32,
    #[serde(default = "default_amount")]
    amount: u32,
}

#[derive(Debug, Deserialize)]
struct RecipeRecord {
    #[serde(default)]
    result: Option<u32>,
    #[serde(default = "default_amount")]
    yields: u32,
    #[serde(default)]
    ingredients: Vec<IngredientRecord>,
}

fn default_amount() -> u32 {
    1
}

impl RecipeRecord {
    fn into_recipe(self) -> Option<Recipe> {
        let result = self.result.filter(|id| *id > 0)?;
        let ingredients = self
            .ingredients
            .into_iter()
            .map(|i| Ingredient::new(ItemId(i.id), i.amount))
            .collect();
        Some(Recipe::new(ItemId(result), self.yields, ingredients))
    }
}

/// Recipes keyed by the item they produce.
#[derive(Debug, Default, Clone)]
pub struct RecipeBook {
    recipes: HashMap<ItemId, Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from recipes in priority order.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut book = Self::new();
        for recipe in recipes {
            book.insert(recipe);
        }
        book
    }

    /// Add `recipe` unless its result already has one. Returns whether it was added.
    pub fn insert(&mut self, recipe: Recipe) -> bool {
        match self.recipes.entry(recipe.result_item_id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(recipe);
                true
            }
        }
    }

    /// Parse recipe JSON. Records without a result id are skipped.
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        let records: Vec<RecipeRecord> = serde_json::from_str(json)?;
        let total = records.len();
        let book = Self::from_recipes(records.into_iter().filter_map(RecipeRecord::into_recipe));
        if book.len() < total {
            info!(
                records = total,
                loaded = book.len(),
                "Skipped recipes without a result or producing an already known item"
            );
        }
        Ok(book)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let book = Self::from_json_str(&json)?;
        info!(path = %path.display(), recipes = book.len(), "Recipes loaded");
        Ok(book)
    }

    /// Load recipes from `path`, downloading them from `url` first when the
    /// file is missing or empty.
    pub async fn load_or_download(
        path: impl AsRef<Path>,
        url: &str,
        timeout: Duration,
    ) -> RegistryResult<Self> {
        let path = path.as_ref();
        let present = tokio::fs::metadata(path)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);

        if !present {
            info!(url, path = %path.display(), "Downloading recipe data");
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| RegistryError::HttpClient(format!("Failed to create HTTP client: {e}")))?;
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| RegistryError::HttpClient(format!("HTTP request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RegistryError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| RegistryError::HttpClient(format!("Failed to read response: {e}")))?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &bytes).await?;
        }

        let json = tokio::fs::read_to_string(path).await?;
        match Self::from_json_str(&json) {
            Ok(book) => {
                info!(path = %path.display(), recipes = book.len(), "Recipes loaded");
                Ok(book)
            }
            Err(e) => {
                // Corrupt cache file; remove it so the next run downloads again.
                warn!(path = %path.display(), error = %e, "Recipe data unreadable, removing");
                remove_corrupt(path).await;
                Err(RegistryError::RecipeData(e.to_string()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Delete an unreadable recipe file. Returns whether it is gone.
async fn remove_corrupt(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove unreadable recipe data; delete it by hand to download again"
            );
            false
        }
    }
}

impl RecipeGraph for RecipeBook {
    fn get_recipe(&self, item_id: ItemId) -> Option<Recipe> {
        self.recipes.get(&item_id).cloned()
    }
}
