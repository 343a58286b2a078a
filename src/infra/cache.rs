//! In-memory TTL caching for upstream price data with stale fallbacks.
//!
//! Entries keep their value after expiry: strict reads treat them as missing,
//! while [`TtlCache::get_stale`] still hands them out so a failed refresh can
//! serve the last known snapshot. Only [`TtlCache::sweep`] ever drops data.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::{ItemMapping, PriceSnapshot};

pub const LATEST_PRICES_KEY: &str = "osrs_prices_latest";
pub const ITEM_MAPPING_KEY: &str = "osrs_item_mapping";

/// Default TTL: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of wall-clock time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: SystemTime) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Fetched from upstream during this call.
    Fresh,
    /// Served from cache within its TTL.
    Cached,
    /// Served from an expired entry because upstream failed.
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: Arc<T>,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: Arc<T>, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

struct Cached<T> {
    value: Arc<T>,
    stored_at: SystemTime,
    ttl: Duration,
}

impl<T> Cached<T> {
    /// How far past its TTL this entry is, or `None` while still fresh.
    fn overdue(&self, now: SystemTime) -> Option<Duration> {
        let age = now.duration_since(self.stored_at).unwrap_or_default();
        if age <= self.ttl {
            None
        } else {
            Some(age - self.ttl)
        }
    }

    fn payload(&self, status: CacheStatus) -> CachedPayload<T> {
        CachedPayload::new(Arc::clone(&self.value), self.stored_at, status)
    }
}

/// Keyed store where each entry expires independently.
///
/// Writers swap a whole `Arc<T>` under the lock, so readers always observe
/// either the previous value or the new one, never a partial update.
pub struct TtlCache<T> {
    entries: RwLock<HashMap<String, Cached<T>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T> TtlCache<T> {
    pub fn new(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Strict read: `None` if the key is missing or past its TTL.
    pub fn get(&self, key: &str) -> Option<CachedPayload<T>> {
        let now = self.clock.now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        match entry.overdue(now) {
            None => Some(entry.payload(CacheStatus::Cached)),
            Some(overdue) => {
                debug!(key, overdue_secs = overdue.as_secs(), "cache entry expired");
                None
            }
        }
    }

    /// Forced read that ignores expiry. Used only as a fallback.
    pub fn get_stale(&self, key: &str) -> Option<CachedPayload<T>> {
        let now = self.clock.now();
        let entries = self.entries.read();
        entries.get(key).map(|entry| match entry.overdue(now) {
            None => entry.payload(CacheStatus::Cached),
            Some(_) => entry.payload(CacheStatus::Stale),
        })
    }

    /// Replaces the entry for `key`; `ttl` overrides the default for this entry only.
    pub fn set(&self, key: &str, value: T, ttl: Option<Duration>) -> CachedPayload<T> {
        let entry = Cached {
            value: Arc::new(value),
            stored_at: self.clock.now(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        let payload = entry.payload(CacheStatus::Fresh);
        self.entries.write().insert(key.to_string(), entry);
        debug!(key, "cache set");
        payload
    }

    /// Drops entries that expired more than `grace` ago. Returns how many were removed.
    pub fn sweep(&self, grace: Duration) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = entry
                .overdue(now)
                .map(|overdue| overdue <= grace)
                .unwrap_or(true);
            if !keep {
                info!(key = key.as_str(), "cache entry swept");
            }
            keep
        });
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// The process-wide price cache: one store per upstream resource, sharing a clock.
pub struct PriceCache {
    prices: TtlCache<PriceSnapshot>,
    mapping: TtlCache<ItemMapping>,
}

impl PriceCache {
    pub fn new(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            prices: TtlCache::new(default_ttl, Arc::clone(&clock)),
            mapping: TtlCache::new(default_ttl, clock),
        }
    }

    pub fn with_system_clock(default_ttl: Duration) -> Self {
        Self::new(default_ttl, Arc::new(SystemClock))
    }

    pub fn prices(&self) -> &TtlCache<PriceSnapshot> {
        &self.prices
    }

    pub fn mapping(&self) -> &TtlCache<ItemMapping> {
        &self.mapping
    }

    pub fn sweep(&self, grace: Duration) -> usize {
        self.prices.sweep(grace) + self.mapping.sweep(grace)
    }
}

/// Periodically sweeps `cache` until the returned handle is aborted.
pub fn spawn_sweeper(cache: Arc<PriceCache>, every: Duration, grace: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep(grace);
            if removed > 0 {
                debug!(removed, "cache sweep finished");
            }
        }
    })
}
