//! Cached access to upstream prices with stale fallbacks.
//!
//! Every read goes cache first. On a miss the upstream is called under a
//! timeout; a failed call falls back to whatever the cache last held, however
//! old, and only errors when nothing was ever cached.

use std::{future::Future, sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::domain::{ItemId, ItemMapping, PriceSnapshot};
use crate::error::{BuyablesError, Result};
use crate::infra::cache::{
    CachedPayload, PriceCache, TtlCache, ITEM_MAPPING_KEY, LATEST_PRICES_KEY,
};
use crate::infra::wiki::{PriceSource, WikiClientError, DEFAULT_TIMEOUT};

/// Item mapping TTL: 24 hours. Ids and names rarely change.
pub const MAPPING_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct PriceFeed<S> {
    source: S,
    cache: Arc<PriceCache>,
    mapping_ttl: Duration,
    timeout: Duration,
}

impl<S: PriceSource> PriceFeed<S> {
    pub fn new(source: S, cache: Arc<PriceCache>) -> Self {
        Self {
            source,
            cache,
            mapping_ttl: MAPPING_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_mapping_ttl(mut self, ttl: Duration) -> Self {
        self.mapping_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &Arc<PriceCache> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Latest price snapshot for every traded item.
    pub async fn latest_prices(&self) -> Result<CachedPayload<PriceSnapshot>> {
        let store = self.cache.prices();
        if let Some(hit) = store.get(LATEST_PRICES_KEY) {
            debug!("returning cached prices");
            return Ok(hit);
        }

        info!("fetching fresh prices from upstream");
        let fetched = self.bounded(self.source.fetch_latest()).await;
        if let Ok(snapshot) = &fetched {
            info!(items = snapshot.len(), "fetched item prices");
        }
        settle(store, LATEST_PRICES_KEY, None, fetched, "prices")
    }

    /// Item id to name mapping, cached far longer than prices.
    pub async fn item_mapping(&self) -> Result<CachedPayload<ItemMapping>> {
        let store = self.cache.mapping();
        if let Some(hit) = store.get(ITEM_MAPPING_KEY) {
            debug!("returning cached item mapping");
            return Ok(hit);
        }

        info!("fetching item mapping from upstream");
        let fetched = self.bounded(self.source.fetch_mapping()).await;
        if let Ok(mapping) = &fetched {
            info!(items = mapping.len(), "fetched item mapping");
        }
        settle(
            store,
            ITEM_MAPPING_KEY,
            Some(self.mapping_ttl),
            fetched,
            "item mapping",
        )
    }

    /// Latest quotes restricted to `item_ids`. Ids without a quote are left out.
    pub async fn prices_for_items(&self, item_ids: &[ItemId]) -> Result<PriceSnapshot> {
        let latest = self.latest_prices().await?;
        Ok(latest.data.retain_items(item_ids))
    }

    async fn bounded<T, F>(&self, call: F) -> std::result::Result<T, WikiClientError>
    where
        F: Future<Output = std::result::Result<T, WikiClientError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(WikiClientError::Timeout(self.timeout)),
        }
    }
}

/// Stores a successful fetch, or falls back to the last cached value on failure.
fn settle<T>(
    store: &TtlCache<T>,
    key: &str,
    ttl: Option<Duration>,
    fetched: std::result::Result<T, WikiClientError>,
    what: &str,
) -> Result<CachedPayload<T>> {
    match fetched {
        Ok(value) => Ok(store.set(key, value, ttl)),
        Err(err) => {
            error!(error = %err, "error fetching {what}");
            if let Some(stale) = store.get_stale(key) {
                warn!(status = ?stale.status, "returning stale {what} as fallback");
                return Ok(stale);
            }
            Err(BuyablesError::FeedUnavailable(err.to_string()))
        }
    }
}
