//! # Demand Engine
//! Pure, testable logic that maps `(items, topics, trends boost)` → `DemandSignal`.
//! No I/O, suitable for unit tests and offline evaluation; `now` is passed in
//! so identical inputs always produce identical output.
//!
//! Policy: filter the sample down to items actually about the topic set,
//! derive market/quality/freshness statistics, score the barrier and the
//! opportunity, classify the market, then combine everything into one score
//! and band. Samples below the minimum size short-circuit to a sentinel
//! signal instead of computing unstable statistics.

use chrono::{DateTime, Utc};

use crate::barrier::score_barrier;
use crate::classifier::{classify, ClassifierInputs};
use crate::config::ScoringConfig;
use crate::demand::{band_for, confidence, demand_score};
use crate::freshness::analyze_freshness;
use crate::market::aggregate_market;
use crate::model::{
    ContentGap, ContentItem, ContentOpportunity, DemandBand, DemandSignal, GapType, Priority,
    TopicSet, TrendsBoost,
};
use crate::opportunity::score_opportunity;
use crate::quality::analyze_quality;
use crate::relevance::filter_relevant;
use crate::suggest::build_opportunities;

/// Compute the full demand signal for a topic set over an already-fetched
/// sample. The boost is optional; absence degrades quality, never
/// correctness.
pub fn compute_demand_signal(
    items: &[ContentItem],
    topics: &TopicSet,
    boost: Option<&TrendsBoost>,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> DemandSignal {
    let relevant = filter_relevant(items, topics, &cfg.relevance);

    if relevant.len() < cfg.relevance.min_sample {
        return sparse_signal(&relevant, boost, now, cfg);
    }

    let metrics = aggregate_market(&relevant, now);
    let quality = analyze_quality(&relevant, &cfg.quality);
    let freshness = analyze_freshness(&relevant, now, &cfg.freshness);

    let barrier = score_barrier(&metrics, &freshness, &cfg.barrier);
    let opportunity = score_opportunity(
        barrier.total,
        &metrics,
        &freshness,
        topics.len(),
        boost,
        &cfg.opportunity,
    );

    let rule = classify(&ClassifierInputs {
        barrier: barrier.total,
        opportunity: opportunity.total,
        timing_bonus: opportunity.timing_bonus,
    });
    let gap = ContentGap {
        score: opportunity.total.round() as u8,
        gap_type: rule.outcome,
        reasoning: rule.reasoning.to_string(),
    };

    let score = demand_score(&metrics, &gap, &freshness, boost, &cfg.demand);
    let band = band_for(score, metrics.video_count, gap.gap_type, &cfg.demand);

    let opportunities = build_opportunities(&gap, &metrics, &quality, &freshness, boost, &cfg.suggest);
    let conf = confidence(relevant.len(), &metrics, boost, &cfg.confidence);

    DemandSignal {
        demand_score: score,
        demand_band: band,
        market_metrics: metrics,
        content_gap: gap,
        opportunities,
        confidence: conf,
        sample_size: relevant.len(),
    }
}

/// Sentinel for samples below the minimum size: `niche` when at least one
/// item matched (the combination exists but is barely covered), `unknown`
/// when nothing did.
fn sparse_signal(
    relevant: &[ContentItem],
    boost: Option<&TrendsBoost>,
    now: DateTime<Utc>,
    cfg: &ScoringConfig,
) -> DemandSignal {
    let metrics = aggregate_market(relevant, now);
    let matched_any = !relevant.is_empty();

    let (band, gap, opportunities) = if matched_any {
        let gap = ContentGap {
            score: cfg.relevance.sentinel_gap_score,
            gap_type: GapType::Underserved,
            reasoning: "Too few relevant videos to score reliably; the combination looks untapped."
                .to_string(),
        };
        let opp = ContentOpportunity::new(
            "untapped_combination",
            "Untapped combination",
            "Almost nobody covers this pairing; a single good upload could own it.",
            Priority::High,
        );
        (DemandBand::Niche, gap, vec![opp])
    } else {
        let gap = ContentGap {
            score: 0,
            gap_type: GapType::Balanced,
            reasoning: "No relevant videos found for this combination.".to_string(),
        };
        (DemandBand::Unknown, gap, Vec::new())
    };

    DemandSignal {
        demand_score: 0,
        demand_band: band,
        market_metrics: metrics,
        content_gap: gap,
        opportunities,
        confidence: confidence(relevant.len(), &metrics, boost, &cfg.confidence),
        sample_size: relevant.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
    }

    fn item(title: &str, views: u64, days_old: i64) -> ContentItem {
        ContentItem {
            id: format!("{title}-{days_old}"),
            view_count: Some(views),
            published_at: now() - chrono::Duration::days(days_old),
            title: title.into(),
            description: "weeknight cooking".into(),
            tags: Vec::new(),
        }
    }

    fn topics() -> TopicSet {
        TopicSet::new(["miso", "pasta"]).unwrap()
    }

    #[test]
    fn empty_sample_reads_unknown_with_no_opportunities() {
        let cfg = ScoringConfig::default();
        let s = compute_demand_signal(&[], &topics(), None, now(), &cfg);
        assert_eq!(s.demand_band, DemandBand::Unknown);
        assert_eq!(s.content_gap.score, 0);
        assert!(s.opportunities.is_empty());
        assert_eq!(s.sample_size, 0);
    }

    #[test]
    fn two_relevant_items_read_niche_with_one_opportunity() {
        let cfg = ScoringConfig::default();
        let items = vec![
            item("miso pasta", 4_000, 20),
            item("miso pasta again", 2_000, 40),
            item("unrelated stew", 9_000, 10),
        ];
        let s = compute_demand_signal(&items, &topics(), None, now(), &cfg);
        assert_eq!(s.demand_band, DemandBand::Niche);
        assert_eq!(s.content_gap.score, 80);
        assert_eq!(s.opportunities.len(), 1);
        assert_eq!(s.opportunities[0].kind, "untapped_combination");
        assert_eq!(s.sample_size, 2);
    }

    #[test]
    fn full_pipeline_is_deterministic() {
        let cfg = ScoringConfig::default();
        let items: Vec<ContentItem> = (0..8)
            .map(|i| item("miso pasta", 10_000 + i * 1_000, 10 + i as i64 * 30))
            .collect();
        let a = compute_demand_signal(&items, &topics(), None, now(), &cfg);
        let b = compute_demand_signal(&items, &topics(), None, now(), &cfg);
        assert_eq!(a, b);
        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn gap_score_equals_opportunity_total() {
        let cfg = ScoringConfig::default();
        let items: Vec<ContentItem> = (0..6)
            .map(|i| item("miso pasta", 60_000, 10 + i as i64))
            .collect();
        let s = compute_demand_signal(&items, &topics(), None, now(), &cfg);
        // 0..=100 by construction, and the band must be legal for the type.
        assert!(s.content_gap.score <= 100);
        if s.content_gap.gap_type == GapType::Saturated {
            assert!(!matches!(
                s.demand_band,
                DemandBand::Hot | DemandBand::Growing
            ));
        }
    }
}
