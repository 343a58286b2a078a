use std::{sync::Arc, time::SystemTime};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::config::Settings;
use crate::domain::{evaluate_catalog, CalculatedItem, ItemMapping};
use crate::error::{BuyablesError, Result};
use crate::infra::cache::{spawn_sweeper, CacheStatus, CachedPayload, PriceCache};
use crate::infra::catalog::{normalize_skill, EmbeddedCatalog, RecipeCatalog};
use crate::infra::feed::PriceFeed;
use crate::infra::wiki::{PriceSource, WikiClient};

/// Ranked training methods for one skill.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyablesReport {
    pub skill: String,
    pub items: Vec<CalculatedItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    /// Whether the prices were fetched now, served from cache, or a stale fallback.
    pub price_status: CacheStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub prices_fetched_at: OffsetDateTime,
}

/// Ties the recipe catalog to the price feed.
pub struct Buyables<S, C> {
    catalog: C,
    feed: PriceFeed<S>,
}

impl Buyables<WikiClient, EmbeddedCatalog> {
    /// Live service against the OSRS Wiki with the embedded dataset.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = WikiClient::from_settings(settings)
            .map_err(|e| BuyablesError::Config(e.to_string()))?;
        let cache = Arc::new(PriceCache::with_system_clock(settings.cache_ttl()));
        let feed = PriceFeed::new(client, cache)
            .with_mapping_ttl(settings.mapping_ttl())
            .with_timeout(settings.request_timeout());
        Ok(Self::new(EmbeddedCatalog, feed))
    }
}

impl<S: PriceSource, C: RecipeCatalog> Buyables<S, C> {
    pub fn new(catalog: C, feed: PriceFeed<S>) -> Self {
        Self { catalog, feed }
    }

    pub fn feed(&self) -> &PriceFeed<S> {
        &self.feed
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn available_skills(&self) -> Vec<String> {
        self.catalog.skills()
    }

    /// Prices every recipe of `skill` and sorts cheapest gp/xp first.
    #[instrument(skip(self))]
    pub async fn buyables_for_skill(&self, skill: &str) -> Result<BuyablesReport> {
        let normalized = normalize_skill(skill);
        let available = self.catalog.skills();
        if !available.contains(&normalized) {
            return Err(BuyablesError::InvalidSkill {
                skill: skill.to_string(),
                available,
            });
        }

        let catalog = self.catalog.load_skill(&normalized)?;
        let prices = self.feed.latest_prices().await?;

        let now = OffsetDateTime::now_utc();
        let items = evaluate_catalog(&catalog, &prices.data, now);
        info!(
            skill = %normalized,
            items = items.len(),
            status = ?prices.status,
            "calculated buyables"
        );

        Ok(BuyablesReport {
            skill: normalized,
            items,
            last_updated: now,
            price_status: prices.status,
            prices_fetched_at: OffsetDateTime::from(prices.fetched_at),
        })
    }

    pub async fn item_mapping(&self) -> Result<CachedPayload<ItemMapping>> {
        self.feed.item_mapping().await
    }

    /// Starts the background cache sweeper with the intervals from `settings`.
    pub fn spawn_sweeper(&self, settings: &Settings) -> JoinHandle<()> {
        spawn_sweeper(
            Arc::clone(self.feed.cache()),
            settings.sweep_interval(),
            settings.sweep_grace(),
        )
    }
}

/// Seconds since `at`, zero if the clock went backwards.
pub fn age_secs(at: SystemTime) -> u64 {
    at.elapsed().map(|age| age.as_secs()).unwrap_or_default()
}
