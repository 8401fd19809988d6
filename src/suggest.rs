//! # Opportunity Suggestions
//! Turns the computed scores into the prioritized, human-readable list the
//! insights surface shows. Triggers are independent and may co-occur;
//! quality and freshness gaps are suppressed in saturated markets where
//! "just upload better" is not actionable advice.

use crate::config::SuggestConfig;
use crate::model::{
    ContentGap, ContentOpportunity, FreshnessAnalysis, GapType, MarketMetrics, Priority,
    QualityDistribution, TrendsBoost,
};

pub fn build_opportunities(
    gap: &ContentGap,
    metrics: &MarketMetrics,
    quality: &QualityDistribution,
    freshness: &FreshnessAnalysis,
    boost: Option<&TrendsBoost>,
    cfg: &SuggestConfig,
) -> Vec<ContentOpportunity> {
    let mut out = Vec::new();
    let saturated = gap.gap_type == GapType::Saturated;

    // Quality gap: a few outliers hoard the views and the long tail is weak.
    if !saturated
        && quality.outlier_ratio > cfg.quality_outlier_min
        && (quality.bottom_performer_views as f64)
            < cfg.quality_bottom_share * quality.top_performer_views as f64
    {
        let priority = if quality.outlier_ratio > cfg.quality_high_outlier {
            Priority::High
        } else {
            Priority::Medium
        };
        out.push(ContentOpportunity::new(
            "quality_gap",
            "Raise the production bar",
            format!(
                "Top videos earn {}x the long tail; well-produced uploads can leapfrog most existing coverage.",
                quality.outlier_ratio.round()
            ),
            priority,
        ));
    }

    // Freshness gap: proven mid-size audience, but nobody has posted lately.
    if !saturated
        && gap.gap_type != GapType::Balanced
        && freshness.recent_video_count < cfg.fresh_max_recent
        && metrics.avg_views > cfg.fresh_min_avg_views
        && metrics.avg_views < cfg.fresh_max_avg_views
        && metrics.video_count < cfg.fresh_max_videos
    {
        let priority = if freshness.recent_video_count == 0 {
            Priority::High
        } else {
            Priority::Medium
        };
        out.push(ContentOpportunity::new(
            "freshness_gap",
            "The catalog has gone stale",
            "Audience interest is proven but nothing recent serves it; a current take can own the results.",
            priority,
        ));
    }

    match gap.gap_type {
        GapType::Underserved => {
            let priority = if gap.score >= cfg.underserved_high_score {
                Priority::High
            } else {
                Priority::Medium
            };
            out.push(ContentOpportunity::new(
                "underserved",
                "Underserved combination",
                "Demand outpaces supply for this combination; straightforward coverage should rank.",
                priority,
            ));
        }
        GapType::Emerging => {
            out.push(ContentOpportunity::new(
                "trending",
                "Ride the emerging wave",
                "Interest is accelerating; publishing now means competing with few incumbents.",
                Priority::High,
            ));
        }
        GapType::Saturated | GapType::Balanced => {}
    }

    // Backup trending call from on-platform freshness alone.
    if freshness.is_emerging_topic
        && gap.gap_type != GapType::Emerging
        && freshness.recent_video_avg_views > cfg.trending_min_recent_avg
    {
        out.push(ContentOpportunity::new(
            "trending",
            "Recent uploads are gaining",
            "Fresh videos on this combination outperform the back catalog.",
            Priority::Medium,
        ));
    }

    if let Some(b) = boost {
        if b.is_breakout {
            out.push(ContentOpportunity::new(
                "google_breakout",
                "Breakout search interest",
                "Search interest is spiking right now; lead time matters more than polish.",
                Priority::High,
            ));
        }

        // Search interest is climbing but the platform hasn't responded yet.
        if b.week_over_week_growth > cfg.velocity_growth_pct
            && freshness.recent_video_count < cfg.velocity_max_recent
            && !b.is_breakout
        {
            let priority = if b.week_over_week_growth > cfg.velocity_high_growth_pct {
                Priority::High
            } else {
                Priority::Medium
            };
            out.push(ContentOpportunity::new(
                "velocity_mismatch",
                "Search is ahead of supply",
                format!(
                    "Search interest grew {:.0}% week over week while almost nothing new was published.",
                    b.week_over_week_growth
                ),
                priority,
            ));
        }
    }

    out
}
