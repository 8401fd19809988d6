//! # Demand Score & Band
//! Combines scale, gap score, velocity, freshness and the optional trends
//! signal into one 0–100 score and a discrete band. When the trends signal
//! is present the view/gap/velocity buckets shrink to make room for it.
//!
//! The saturation override lives here: a saturated market must never read
//! `hot` or `growing`, whatever the raw weighted score says.

use crate::config::{tier_points, ConfidenceConfig, DemandConfig};
use crate::model::{
    clamp01, round_score, ContentGap, DemandBand, FreshnessAnalysis, GapType, MarketMetrics,
    TrendsBoost,
};

/// log10 with a floor of 1 so sparse markets score 0 instead of -inf.
fn log10_floor(x: u64) -> f64 {
    (x.max(1) as f64).log10()
}

pub fn demand_score(
    metrics: &MarketMetrics,
    gap: &ContentGap,
    freshness: &FreshnessAnalysis,
    boost: Option<&TrendsBoost>,
    cfg: &DemandConfig,
) -> u8 {
    let w = if boost.is_some() {
        cfg.weights_with_trends
    } else {
        cfg.weights_plain
    };

    let view_score =
        (log10_floor(metrics.avg_views) * w.view_cap / cfg.view_full_log10).min(w.view_cap);
    let gap_score = gap.score as f64 * w.gap_weight;
    let velocity_score = (log10_floor(metrics.avg_views_per_day) * w.velocity_cap
        / cfg.velocity_full_log10)
        .min(w.velocity_cap);

    let freshness_bonus = if freshness.is_emerging_topic {
        cfg.emerging_bonus
    } else if freshness.recent_video_avg_views > metrics.avg_views {
        cfg.fresh_bonus
    } else {
        0.0
    };

    let trends_bonus = boost.map_or(0.0, |b| {
        let interest =
            (b.interest_score / cfg.trends_interest_divisor).min(cfg.trends_interest_cap);
        let growth = tier_points(&cfg.trends_growth_tiers, b.week_over_week_growth);
        let breakout = if b.is_breakout {
            cfg.trends_breakout_bonus
        } else {
            0.0
        };
        interest + growth + breakout
    });

    round_score(view_score + gap_score + velocity_score + freshness_bonus + trends_bonus)
}

/// Map a score to its band; sparse samples read `unknown` instead of `niche`.
/// Applies the saturation override.
pub fn band_for(score: u8, video_count: usize, gap_type: GapType, cfg: &DemandConfig) -> DemandBand {
    let raw = if score >= cfg.band_hot {
        DemandBand::Hot
    } else if score >= cfg.band_growing {
        DemandBand::Growing
    } else if score >= cfg.band_stable {
        DemandBand::Stable
    } else if video_count >= cfg.min_band_sample {
        DemandBand::Niche
    } else {
        DemandBand::Unknown
    };

    if gap_type == GapType::Saturated
        && matches!(raw, DemandBand::Hot | DemandBand::Growing)
    {
        return DemandBand::Stable;
    }
    raw
}

/// Trust in the signal: sample size dominates, with small bonuses for scale
/// and for a live external interest reading.
pub fn confidence(
    sample_size: usize,
    metrics: &MarketMetrics,
    boost: Option<&TrendsBoost>,
    cfg: &ConfidenceConfig,
) -> f32 {
    let mut c = (sample_size as f32 / cfg.sample_divisor).min(cfg.base_cap);
    if metrics.avg_views > cfg.avg_views_bonus_min {
        c += cfg.bonus;
    }
    if metrics.video_count >= cfg.video_count_bonus_min {
        c += cfg.bonus;
    }
    if let Some(b) = boost {
        if b.interest_score > 0.0 {
            c += cfg.bonus;
            if b.interest_score > cfg.interest_extra_min {
                c += cfg.bonus;
            }
        }
    }
    clamp01(c)
}
