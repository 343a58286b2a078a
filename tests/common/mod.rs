#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;

use buyables::domain::{ItemDescriptor, ItemMapping, PriceQuote, PriceSnapshot};
use buyables::infra::cache::ManualClock;
use buyables::{
    Buyables, MemoryCatalog, PriceCache, PriceFeed, PriceSource, RecipeCatalog, WikiClientError,
};

pub const PRICE_TTL: Duration = Duration::from_secs(300);

/// Scripted upstream response.
pub enum Reply<T> {
    Ok(T),
    Fail(&'static str),
    Hang,
}

/// Stand-in for the OSRS Wiki that replays queued replies and counts calls.
#[derive(Default)]
pub struct FakeSource {
    latest: Mutex<VecDeque<Reply<PriceSnapshot>>>,
    mapping: Mutex<VecDeque<Reply<ItemMapping>>>,
    latest_calls: AtomicUsize,
    mapping_calls: AtomicUsize,
}

impl FakeSource {
    pub fn push_latest(&self, reply: Reply<PriceSnapshot>) {
        self.latest.lock().push_back(reply);
    }

    pub fn push_mapping(&self, reply: Reply<ItemMapping>) {
        self.mapping.lock().push_back(reply);
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn mapping_calls(&self) -> usize {
        self.mapping_calls.load(Ordering::SeqCst)
    }
}

async fn play<T>(reply: Option<Reply<T>>) -> Result<T, WikiClientError> {
    match reply {
        Some(Reply::Ok(value)) => Ok(value),
        Some(Reply::Fail(message)) => Err(WikiClientError::Api(message.to_string())),
        Some(Reply::Hang) => std::future::pending().await,
        None => Err(WikiClientError::Api("no scripted reply".to_string())),
    }
}

#[async_trait]
impl PriceSource for FakeSource {
    async fn fetch_latest(&self) -> Result<PriceSnapshot, WikiClientError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.latest.lock().pop_front();
        play(reply).await
    }

    async fn fetch_mapping(&self) -> Result<ItemMapping, WikiClientError> {
        self.mapping_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.mapping.lock().pop_front();
        play(reply).await
    }
}

pub fn quote(high: Option<f64>, low: Option<f64>) -> PriceQuote {
    PriceQuote {
        high,
        low,
        ..PriceQuote::default()
    }
}

pub fn snapshot(quotes: &[(u32, Option<f64>, Option<f64>)]) -> PriceSnapshot {
    quotes
        .iter()
        .map(|&(id, high, low)| (id, quote(high, low)))
        .collect()
}

pub fn descriptor(id: u32, name: &str) -> ItemDescriptor {
    ItemDescriptor {
        id,
        name: name.to_string(),
        examine: None,
        members: Some(true),
        limit: Some(10_000),
        value: None,
        lowalch: None,
        highalch: None,
        icon: None,
    }
}

/// The cooking and prayer examples as a two-skill catalog.
pub fn example_catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_skill_json(
            "cooking",
            r#"{"items": [
                {"itemId": 1, "name": "X", "level": 1, "xpGained": 10,
                 "materials": [{"itemId": 2, "name": "Y", "quantity": 2}]}
            ]}"#,
        )
        .and_then(|c| {
            c.with_skill_json(
                "prayer",
                r#"{"resaleEligible": false, "items": [
                    {"itemId": 5, "name": "Bones", "level": 1, "xpGained": 5,
                     "materials": [{"itemId": 6, "name": "Bones", "quantity": 1}]}
                ]}"#,
            )
        })
        .expect("example catalog parses")
}

pub struct Harness<C> {
    pub service: Buyables<FakeSource, C>,
    pub clock: Arc<ManualClock>,
}

impl<C: RecipeCatalog> Harness<C> {
    pub fn source(&self) -> &FakeSource {
        self.service.feed().source()
    }
}

pub fn harness<C: RecipeCatalog>(catalog: C) -> Harness<C> {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(PriceCache::new(PRICE_TTL, clock.clone()));
    let feed = PriceFeed::new(FakeSource::default(), cache).with_timeout(Duration::from_secs(10));
    Harness {
        service: Buyables::new(catalog, feed),
        clock,
    }
}
