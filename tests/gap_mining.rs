// tests/gap_mining.rs
//
// Integration tests for the content gap miner against the in-memory catalog:
// the 5-item survivor floor, ranking, the exact breakout multiplier, and
// cached demand-band attachment.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use recipe_demand_analyzer::cache::{DemandCache, TtlDemandCache};
use recipe_demand_analyzer::catalog::InMemoryCatalog;
use recipe_demand_analyzer::config::ScoringConfig;
use recipe_demand_analyzer::find_content_gaps;
use recipe_demand_analyzer::model::{
    ContentGap, ContentItem, DemandBand, DemandSignal, GapType, MarketMetrics, TopicSet, TopicTag,
    TrendsBoost,
};
use recipe_demand_analyzer::trends::{DisabledTrends, TrendsProvider};

fn tagged_item(id: &str, views: u64, tags: &[&str]) -> ContentItem {
    ContentItem {
        id: id.into(),
        view_count: Some(views),
        published_at: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
        title: format!("{} recipe", tags.join(" ")),
        description: String::new(),
        tags: tags
            .iter()
            .map(|t| TopicTag {
                name: (*t).into(),
                confidence: 0.85,
            })
            .collect(),
    }
}

fn catalog_with(items: Vec<ContentItem>) -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::new(items))
}

fn empty_cache() -> Arc<TtlDemandCache> {
    Arc::new(TtlDemandCache::new(Duration::from_secs(300)))
}

/// Provider that reports a breakout for every lookup.
struct AlwaysBreakout;

#[async_trait::async_trait]
impl TrendsProvider for AlwaysBreakout {
    async fn boost(&self, _topics: &TopicSet) -> Option<TrendsBoost> {
        Some(TrendsBoost {
            interest_score: 90.0,
            week_over_week_growth: 180.0,
            is_breakout: true,
        })
    }
    fn name(&self) -> &'static str {
        "always_breakout"
    }
}

#[tokio::test]
async fn four_survivors_short_circuit_to_empty_report() {
    let items: Vec<ContentItem> = (0..4)
        .map(|i| tagged_item(&format!("v{i}"), 50_000, &["miso", "butter"]))
        .collect();
    let report = find_content_gaps(
        catalog_with(items),
        Arc::new(DisabledTrends),
        empty_cache(),
        &TopicSet::new(["miso"]).unwrap(),
        &ScoringConfig::default(),
    )
    .await
    .unwrap();

    assert!(report.gaps.is_empty());
    assert_eq!(report.total_videos, 4);
    assert_eq!(report.source, "recipe_analysis");
    assert_eq!(report.base_topics, vec!["miso".to_string()]);
}

#[tokio::test]
async fn apparent_cooccurrence_strength_cannot_bypass_the_floor() {
    // Strong, unanimous co-occurrence among too few items still yields no gaps.
    let items: Vec<ContentItem> = (0..4)
        .map(|i| tagged_item(&format!("v{i}"), 900_000, &["miso", "truffle"]))
        .collect();
    let report = find_content_gaps(
        catalog_with(items),
        Arc::new(DisabledTrends),
        empty_cache(),
        &TopicSet::new(["miso"]).unwrap(),
        &ScoringConfig::default(),
    )
    .await
    .unwrap();
    assert!(report.gaps.is_empty());
}

#[tokio::test]
async fn breakout_boost_doubles_gap_scores_exactly() {
    let build = || {
        let items: Vec<ContentItem> = (0..6)
            .map(|i| tagged_item(&format!("v{i}"), 30_000, &["miso", "butter"]))
            .collect();
        catalog_with(items)
    };
    let base = TopicSet::new(["miso"]).unwrap();
    let cfg = ScoringConfig::default();

    let plain = find_content_gaps(
        build(),
        Arc::new(DisabledTrends),
        empty_cache(),
        &base,
        &cfg,
    )
    .await
    .unwrap();
    let boosted = find_content_gaps(
        build(),
        Arc::new(AlwaysBreakout),
        empty_cache(),
        &base,
        &cfg,
    )
    .await
    .unwrap();

    let p = &plain.gaps[0];
    let b = &boosted.gaps[0];
    assert_eq!(p.ingredient, "butter");
    assert_eq!(b.ingredient, "butter");
    assert!((b.gap_score / p.gap_score - 2.0).abs() < 1e-12);
    assert!(b.is_breakout);
    assert!(!p.is_breakout);
    assert_eq!(b.trends_insight.as_deref(), Some("Breakout search interest right now"));
    assert!(p.trends_insight.is_none());
}

#[tokio::test]
async fn gaps_are_ranked_and_capped_at_ten() {
    // 33 items rotating through 11 side ingredients (3 occurrences each,
    // clearing the occurrence floor), plus "butter" on every item so it
    // dominates. 12 candidates total, so the report must cut to 10.
    let mut items = Vec::new();
    for i in 0..33 {
        let extra = format!("extra{:02}", i % 11);
        items.push(tagged_item(
            &format!("v{i:02}"),
            20_000 + (i as u64) * 1_000,
            &["miso", "butter", extra.as_str()],
        ));
    }
    let report = find_content_gaps(
        catalog_with(items),
        Arc::new(DisabledTrends),
        empty_cache(),
        &TopicSet::new(["miso"]).unwrap(),
        &ScoringConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.gaps.len(), 10);
    assert_eq!(report.gaps[0].ingredient, "butter");
    for pair in report.gaps.windows(2) {
        assert!(pair[0].gap_score >= pair[1].gap_score);
    }
}

#[tokio::test]
async fn cached_demand_band_is_attached_to_candidates() {
    let items: Vec<ContentItem> = (0..6)
        .map(|i| tagged_item(&format!("v{i}"), 40_000, &["miso", "butter"]))
        .collect();
    let cache = empty_cache();

    // A previous demand computation for the combined set sits in the cache.
    let combined_key = TopicSet::new(["miso", "butter"]).unwrap().cache_key();
    let cached = DemandSignal {
        demand_score: 62,
        demand_band: DemandBand::Growing,
        market_metrics: MarketMetrics::default(),
        content_gap: ContentGap {
            score: 55,
            gap_type: GapType::Underserved,
            reasoning: String::new(),
        },
        opportunities: Vec::new(),
        confidence: 0.5,
        sample_size: 8,
    };
    cache.insert(&combined_key, cached).await;

    let report = find_content_gaps(
        catalog_with(items),
        Arc::new(DisabledTrends),
        cache,
        &TopicSet::new(["miso"]).unwrap(),
        &ScoringConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.gaps[0].ingredient, "butter");
    assert_eq!(report.gaps[0].demand_band, Some(DemandBand::Growing));
}
