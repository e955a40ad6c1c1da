//! Application wiring.
//!
//! Owns the market client and the lazily loaded recipe book, and runs the
//! synchronous engines on the blocking pool so the resolver can call back
//! into the async client.

use crate::config::{check_window_hours, AppConfig};
use crate::error::{AppError, AppResult};
use craftbook_analytics::{analyze, screen_hot_items, HotItem, MarketMetrics};
use craftbook_core::{ItemId, Price};
use craftbook_registry::{BlockingPriceBook, MarketClient, RecipeBook};
use craftbook_resolver::{CostResolver, CraftingResult, NoRecipeCache};
use craftbook_telemetry::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Main application.
pub struct Application {
    config: AppConfig,
    market: Arc<MarketClient>,
    no_recipe: Arc<NoRecipeCache>,
    recipes: OnceCell<Arc<RecipeBook>>,
}

impl Application {
    /// Create the application. Fails on invalid configuration.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let market = Arc::new(MarketClient::new(config.market.clone())?);

        Ok(Self {
            config,
            market,
            no_recipe: Arc::new(NoRecipeCache::new()),
            recipes: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Use `recipes` instead of loading them from disk.
    pub fn with_recipes(self, recipes: RecipeBook) -> Self {
        Self {
            recipes: OnceCell::new_with(Some(Arc::new(recipes))),
            ..self
        }
    }

    /// Cheapest way to craft `item_id`.
    pub async fn craft(&self, item_id: ItemId, region: Option<&str>) -> AppResult<CraftingResult> {
        let region = self.config.region(region);
        let recipes = Arc::clone(self.recipes().await?);
        let prices = BlockingPriceBook::new(Arc::clone(&self.market), Handle::current());
        let resolver = CostResolver::with_cache(
            recipes,
            prices,
            self.config.resolver,
            Arc::clone(&self.no_recipe),
        );

        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || resolver.resolve(item_id, &region)).await?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        Metrics::resolution(result.status.as_str(), elapsed_ms);
        info!(
            %item_id,
            status = result.status.as_str(),
            total_cost = %result.display_total_cost(),
            profit = %result.profit,
            elapsed_ms,
            "Craft resolved"
        );
        Ok(result)
    }

    /// Market health for `item_id`. Items the market does not know analyze as empty.
    pub async fn analyze(
        &self,
        item_id: ItemId,
        region: Option<&str>,
        hq_only: bool,
    ) -> AppResult<MarketMetrics> {
        let region = self.config.region(region);
        let mut snapshots = self.market.fetch_batch(&region, &[item_id]).await?;
        let snapshot = snapshots.remove(&item_id).unwrap_or_default();
        snapshot.validate()?;

        let config = self.config.analytics.clone();
        let metrics =
            tokio::task::spawn_blocking(move || analyze(&snapshot, &config, hq_only)).await?;

        Metrics::analysis(metrics.average_price_type.as_str());
        info!(
            %item_id,
            %region,
            hq_only,
            velocity = %metrics.velocity,
            average_price = %metrics.average_price,
            average_price_type = %metrics.average_price_type,
            "Market analyzed"
        );
        Ok(metrics)
    }

    /// Recently traded items in `region`, hottest first.
    ///
    /// `window_hours` and `sample_size` default to the `[hot_items]` settings.
    pub async fn hot_items(
        &self,
        region: Option<&str>,
        window_hours: Option<u32>,
        sample_size: Option<usize>,
    ) -> AppResult<Vec<HotItem>> {
        let region = self.config.region(region);
        let settings = &self.config.hot_items;
        let window_hours = window_hours.unwrap_or(settings.window_hours);
        check_window_hours(window_hours)?;
        let sample_size = sample_size.unwrap_or(settings.sample_size);

        let ids = self.market.fetch_recently_updated(&region, sample_size).await?;
        debug!(%region, candidates = ids.len(), "Screening candidates");
        let snapshots = self.market.fetch_batch(&region, &ids).await?;

        let threshold = Price::new(settings.min_price_threshold);
        let hot = screen_hot_items(&snapshots, window_hours, threshold, chrono::Utc::now());

        Metrics::hot_items(hot.len());
        info!(%region, window_hours, hot = hot.len(), "Hot items ranked");
        Ok(hot)
    }

    async fn recipes(&self) -> AppResult<&Arc<RecipeBook>> {
        let source = &self.config.recipes;
        self.recipes
            .get_or_try_init(|| async {
                let book =
                    RecipeBook::load_or_download(&source.path, &source.url, source.download_timeout())
                        .await?;
                Ok::<_, AppError>(Arc::new(book))
            })
            .await
    }
}
