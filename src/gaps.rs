//! # Content Gap Miner
//! Mines high-performing items for co-occurring topics, weights them by
//! performance, and scores each candidate as a content gap: proven to pair
//! well with the base set, under-covered as a combination.
//!
//! Per-candidate enrichment (combined-coverage count, trends boost, cached
//! demand band) fans out through a semaphore-bounded `JoinSet`, so latency
//! does not scale linearly with candidate count and dropping the future
//! aborts in-flight lookups.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::cache::DemandCache;
use crate::catalog::CatalogIndex;
use crate::config::{GapMiningConfig, ScoringConfig};
use crate::model::{
    ContentItem, GapReport, IngredientGap, TopicSet, TrendsBoost, GAP_SOURCE_RECIPE_ANALYSIS,
};
use crate::trends::TrendsProvider;

/// Per-candidate accumulation over the surviving pool.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CandidateStats {
    /// Σ log10(views) over items containing the candidate.
    pub weighted_score: f64,
    pub co_occurrence_count: usize,
    pub views_sum: u64,
}

impl CandidateStats {
    pub fn avg_views(&self) -> u64 {
        if self.co_occurrence_count == 0 {
            0
        } else {
            self.views_sum / self.co_occurrence_count as u64
        }
    }
}

/// Pure gap-score formula; exercised directly by tests.
///
/// Base: performance-weighted co-occurrence share, damped by how much the
/// full combination is already covered. Multipliers reward strong average
/// performance and live search momentum.
pub fn score_candidate(
    stats: &CandidateStats,
    surviving_count: usize,
    combined_video_count: u64,
    boost: Option<&TrendsBoost>,
    cfg: &GapMiningConfig,
) -> f64 {
    if surviving_count == 0 {
        return 0.0;
    }

    let share = stats.co_occurrence_count as f64 / surviving_count as f64;
    let mut score = stats.weighted_score * share / (combined_video_count as f64 + 1.0);

    let avg = stats.avg_views();
    if avg > cfg.perf_strong_avg_views {
        score *= cfg.perf_strong_multiplier;
    } else if avg > cfg.perf_good_avg_views {
        score *= cfg.perf_good_multiplier;
    }

    if let Some(b) = boost {
        if b.is_breakout {
            score *= cfg.trends_breakout_multiplier;
        } else if b.week_over_week_growth > cfg.trends_growth_strong_pct {
            score *= cfg.trends_growth_strong_multiplier;
        } else if b.week_over_week_growth > cfg.trends_growth_mild_pct {
            score *= cfg.trends_growth_mild_multiplier;
        } else if b.week_over_week_growth < cfg.trends_decline_pct {
            score *= cfg.trends_decline_multiplier;
        }
    }

    score
}

fn insight_for(boost: &TrendsBoost, cfg: &GapMiningConfig) -> Option<String> {
    if boost.is_breakout {
        Some("Breakout search interest right now".to_string())
    } else if boost.week_over_week_growth > cfg.trends_growth_mild_pct {
        Some(format!(
            "Search interest up {:.0}% week over week",
            boost.week_over_week_growth
        ))
    } else if boost.week_over_week_growth < cfg.trends_decline_pct {
        Some("Search interest declining".to_string())
    } else {
        None
    }
}

/// Tally co-occurring non-base topics across the surviving pool. BTreeMap
/// keeps candidate order stable for deterministic output.
fn collect_candidates(
    surviving: &[ContentItem],
    base: &TopicSet,
    min_confidence: f32,
) -> BTreeMap<String, CandidateStats> {
    let mut candidates: BTreeMap<String, CandidateStats> = BTreeMap::new();
    for item in surviving {
        let views = item.views();
        let mut tags = item.confident_tags(min_confidence);
        tags.sort();
        tags.dedup();
        for tag in tags {
            if base.contains(&tag) {
                continue;
            }
            let stats = candidates.entry(tag).or_default();
            stats.weighted_score += (views.max(1) as f64).log10();
            stats.co_occurrence_count += 1;
            stats.views_sum += views;
        }
    }
    candidates
}

/// Mine content gaps for a base topic set against the catalog.
pub async fn find_content_gaps(
    catalog: Arc<dyn CatalogIndex>,
    trends: Arc<dyn TrendsProvider>,
    cache: Arc<dyn DemandCache>,
    base: &TopicSet,
    cfg: &ScoringConfig,
) -> Result<GapReport> {
    let g = &cfg.gaps;

    let pool = catalog
        .top_tagged_items(g.pool_limit, g.pool_min_views, g.tag_min_confidence)
        .await?;

    // Same unified match rule as the relevance filter, applied to tags.
    let min_match = cfg.relevance.required_matches(base.len());
    let surviving: Vec<ContentItem> = pool
        .into_iter()
        .filter(|it| {
            let tags = it.confident_tags(g.tag_min_confidence);
            base.topics()
                .iter()
                .filter(|t| tags.iter().any(|tag| tag == *t))
                .count()
                >= min_match
        })
        .collect();

    let surviving_count = surviving.len();
    if surviving_count < g.min_surviving {
        // Hard floor: no gaps from unreliable samples.
        debug!(target: "gaps", surviving_count, floor = g.min_surviving, "pool below floor");
        return Ok(GapReport {
            base_topics: base.topics().to_vec(),
            gaps: Vec::new(),
            total_videos: surviving_count,
            source: GAP_SOURCE_RECIPE_ANALYSIS.to_string(),
        });
    }

    let mut candidates = collect_candidates(&surviving, base, g.tag_min_confidence);
    let min_occurrences = g.min_occurrences(surviving_count);
    candidates.retain(|_, stats| stats.co_occurrence_count >= min_occurrences);

    // Bounded fan-out: each candidate's lookups are independent and
    // read-only. Lookup failures degrade the candidate, never the report.
    let semaphore = Arc::new(Semaphore::new(g.lookup_concurrency.max(1)));
    let mut join_set: JoinSet<IngredientGap> = JoinSet::new();

    for (name, stats) in candidates {
        let combined = base.with_topic(&name);
        let catalog = catalog.clone();
        let trends = trends.clone();
        let cache = cache.clone();
        let semaphore = semaphore.clone();
        let g = g.clone();

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

            let combined_count = catalog.count_matching(&combined).await.unwrap_or(0);
            let boost = trends.boost(&combined).await;
            let cached_band = cache
                .get(&combined.cache_key())
                .await
                .map(|s| s.demand_band);

            let gap_score =
                score_candidate(&stats, surviving_count, combined_count, boost.as_ref(), &g);

            IngredientGap {
                ingredient: name,
                co_occurrence_count: stats.co_occurrence_count,
                video_count: combined_count,
                gap_score,
                demand_band: cached_band,
                trends_insight: boost.as_ref().and_then(|b| insight_for(b, &g)),
                trends_growth: boost.as_ref().map(|b| b.week_over_week_growth),
                is_breakout: boost.map(|b| b.is_breakout).unwrap_or(false),
            }
        });
    }

    let mut gaps = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(gap) => gaps.push(gap),
            // A panicked lookup task loses one candidate, nothing more.
            Err(e) => debug!(target: "gaps", error = %e, "candidate lookup task failed"),
        }
    }

    gaps.sort_by(|a, b| {
        b.gap_score
            .partial_cmp(&a.gap_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.ingredient.cmp(&b.ingredient))
    });
    gaps.truncate(g.max_gaps);

    Ok(GapReport {
        base_topics: base.topics().to_vec(),
        gaps,
        total_videos: surviving_count,
        source: GAP_SOURCE_RECIPE_ANALYSIS.to_string(),
    })
}
