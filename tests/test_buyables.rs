mod common;

use std::time::Duration;

use buyables::domain::SkillCatalog;
use buyables::infra::catalog::AVAILABLE_SKILLS;
use buyables::{BuyablesError, CacheStatus, EmbeddedCatalog, RecipeCatalog};

use common::{descriptor, example_catalog, harness, snapshot, Reply};

#[tokio::test]
async fn cooking_example_end_to_end() {
    let h = harness(example_catalog());
    h.source()
        .push_latest(Reply::Ok(snapshot(&[(1, Some(100.0), None), (2, None, Some(20.0))])));

    let report = h
        .service
        .buyables_for_skill("cooking")
        .await
        .expect("report");

    assert_eq!(report.skill, "cooking");
    assert_eq!(report.price_status, CacheStatus::Fresh);
    let item = &report.items[0];
    assert_eq!(item.sell_price, 100.0);
    assert_eq!(item.material_cost, 40.0);
    assert_eq!(item.net_profit, 60.0);
    assert_eq!(item.price_per_xp, -6.0);
    assert!(item.is_profit);
}

#[tokio::test]
async fn prayer_example_end_to_end() {
    let h = harness(example_catalog());
    h.source()
        .push_latest(Reply::Ok(snapshot(&[(5, Some(400.0), Some(390.0)), (6, None, Some(50.0))])));

    let report = h.service.buyables_for_skill("Prayer").await.expect("report");

    assert_eq!(report.skill, "prayer");
    let item = &report.items[0];
    assert_eq!(item.sell_price, 0.0);
    assert_eq!(item.material_cost, 50.0);
    assert_eq!(item.price_per_xp, 10.0);
    assert!(!item.is_profit);
}

#[tokio::test]
async fn unknown_skill_lists_the_valid_ones() {
    let h = harness(EmbeddedCatalog);

    let err = h.service.buyables_for_skill("alchemy").await.unwrap_err();

    match err {
        BuyablesError::InvalidSkill { skill, available } => {
            assert_eq!(skill, "alchemy");
            assert_eq!(available, AVAILABLE_SKILLS.map(String::from).to_vec());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.source().latest_calls(), 0);
}

#[tokio::test]
async fn upstream_failure_without_cache_is_unavailable() {
    let h = harness(example_catalog());
    h.source().push_latest(Reply::Fail("503 Service Unavailable"));

    let err = h.service.buyables_for_skill("cooking").await.unwrap_err();

    assert!(
        matches!(err, BuyablesError::FeedUnavailable(ref m) if m.contains("503")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn upstream_failure_serves_stale_prices() {
    let h = harness(example_catalog());
    h.source()
        .push_latest(Reply::Ok(snapshot(&[(1, Some(100.0), None), (2, None, Some(20.0))])));
    h.source().push_latest(Reply::Fail("connection reset"));

    let first = h.service.buyables_for_skill("cooking").await.expect("fresh");
    h.clock.advance(Duration::from_secs(600));
    let second = h.service.buyables_for_skill("cooking").await.expect("stale");

    assert_eq!(second.price_status, CacheStatus::Stale);
    assert_eq!(second.items[0].price_per_xp, first.items[0].price_per_xp);
    assert_eq!(second.prices_fetched_at, first.prices_fetched_at);
    assert_eq!(h.source().latest_calls(), 2);
}

#[tokio::test]
async fn repeated_requests_within_ttl_hit_the_cache() {
    let h = harness(example_catalog());
    h.source()
        .push_latest(Reply::Ok(snapshot(&[(1, Some(100.0), None)])));

    h.service.buyables_for_skill("cooking").await.expect("fresh");
    h.clock.advance(Duration::from_secs(120));
    let report = h.service.buyables_for_skill("prayer").await.expect("cached");

    assert_eq!(report.price_status, CacheStatus::Cached);
    assert_eq!(h.source().latest_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_upstream_times_out_to_stale_prices() {
    let h = harness(example_catalog());
    h.source()
        .push_latest(Reply::Ok(snapshot(&[(1, Some(100.0), None)])));
    h.source().push_latest(Reply::Hang);

    h.service.buyables_for_skill("cooking").await.expect("fresh");
    h.clock.advance(Duration::from_secs(301));
    let report = h.service.buyables_for_skill("cooking").await.expect("stale");

    assert_eq!(report.price_status, CacheStatus::Stale);
}

#[tokio::test(start_paused = true)]
async fn hung_upstream_without_cache_is_unavailable() {
    let h = harness(example_catalog());
    h.source().push_latest(Reply::Hang);

    let err = h.service.buyables_for_skill("cooking").await.unwrap_err();

    assert!(
        matches!(err, BuyablesError::FeedUnavailable(ref m) if m.contains("timed out")),
        "got {err:?}"
    );
}

struct BrokenCatalog;

impl RecipeCatalog for BrokenCatalog {
    fn skills(&self) -> Vec<String> {
        vec!["cooking".to_string()]
    }

    fn load_skill(&self, name: &str) -> buyables::Result<SkillCatalog> {
        Err(BuyablesError::DataCorrupt {
            skill: name.to_string(),
            reason: "truncated file".to_string(),
        })
    }
}

#[tokio::test]
async fn catalog_failure_propagates_before_fetching() {
    let h = harness(BrokenCatalog);

    let err = h.service.buyables_for_skill("cooking").await.unwrap_err();

    assert!(matches!(err, BuyablesError::DataCorrupt { .. }));
    assert_eq!(h.source().latest_calls(), 0);
}

#[tokio::test]
async fn embedded_skills_rank_non_decreasing() {
    let h = harness(EmbeddedCatalog);
    // Every herblore ingredient priced, a few outputs left unpriced.
    h.source().push_latest(Reply::Ok(snapshot(&[
        (121, Some(40.0), Some(35.0)),
        (115, Some(120.0), Some(110.0)),
        (139, Some(9_000.0), Some(8_900.0)),
        (91, None, Some(15.0)),
        (221, None, Some(3.0)),
        (95, None, Some(20.0)),
        (225, None, Some(60.0)),
        (99, None, Some(7_500.0)),
        (231, None, Some(150.0)),
        (3026, Some(11_000.0), Some(10_800.0)),
        (3004, None, Some(9_000.0)),
        (223, None, Some(300.0)),
    ])));

    let report = h.service.buyables_for_skill("herblore").await.expect("report");

    let recipes = EmbeddedCatalog.load_skill("herblore").expect("catalog");
    assert_eq!(report.items.len(), recipes.items.len());
    assert!(report
        .items
        .windows(2)
        .all(|pair| pair[0].price_per_xp <= pair[1].price_per_xp));
}

#[tokio::test]
async fn report_serializes_with_camel_case_fields() {
    let h = harness(example_catalog());
    h.source()
        .push_latest(Reply::Ok(snapshot(&[(1, Some(100.0), None), (2, None, Some(20.0))])));

    let report = h.service.buyables_for_skill("cooking").await.expect("report");
    let json = serde_json::to_value(&report).expect("serializes");

    assert_eq!(json["skill"], "cooking");
    assert_eq!(json["priceStatus"], "fresh");
    assert!(json["lastUpdated"].is_string());
    let item = &json["items"][0];
    assert_eq!(item["itemId"], 1);
    assert_eq!(item["xpGained"], 10.0);
    assert_eq!(item["pricePerXp"], -6.0);
    assert_eq!(item["isProfit"], true);
    assert_eq!(item["materials"][0]["unitCost"], 20.0);
    assert_eq!(item["materials"][0]["totalCost"], 40.0);
    assert!(item["lastUpdated"].is_string());
}

#[tokio::test]
async fn item_mapping_uses_long_ttl_and_stale_fallback() {
    let h = harness(example_catalog());
    h.source()
        .push_mapping(Reply::Ok(vec![descriptor(536, "Dragon bones")]));
    h.source().push_mapping(Reply::Fail("timeout"));

    let first = h.service.item_mapping().await.expect("fresh");
    assert_eq!(first.status, CacheStatus::Fresh);

    // Well past the price TTL, still inside the mapping TTL.
    h.clock.advance(Duration::from_secs(3_600));
    let cached = h.service.item_mapping().await.expect("cached");
    assert_eq!(cached.status, CacheStatus::Cached);
    assert_eq!(h.source().mapping_calls(), 1);

    h.clock.advance(Duration::from_secs(24 * 3_600));
    let stale = h.service.item_mapping().await.expect("stale");
    assert_eq!(stale.status, CacheStatus::Stale);
    assert_eq!(stale.data[0].name, "Dragon bones");
    assert_eq!(h.source().mapping_calls(), 2);
}
