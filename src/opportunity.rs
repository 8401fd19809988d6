//! # Opportunity Score
//! 0–100, higher = more favorable for a newcomer. Accessibility (inverse of
//! the barrier), validated demand, timing, and a niche advantage for
//! specific multi-ingredient combinations.

use crate::config::{tier_points, OpportunityConfig};
use crate::model::{FreshnessAnalysis, MarketMetrics, TrendsBoost};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityBreakdown {
    pub accessibility: f64,
    pub demand_validation: f64,
    /// Capped timing bonus; also feeds the market classifier.
    pub timing_bonus: f64,
    pub niche_advantage: f64,
    pub total: f64,
}

pub fn score_opportunity(
    barrier_total: f64,
    metrics: &MarketMetrics,
    freshness: &FreshnessAnalysis,
    topic_count: usize,
    boost: Option<&TrendsBoost>,
    cfg: &OpportunityConfig,
) -> OpportunityBreakdown {
    let accessibility = cfg
        .accessibility_tiers
        .iter()
        .find(|t| barrier_total <= t.max_barrier)
        .map(|t| t.points)
        .unwrap_or(0.0);

    let tiered = tier_points(&cfg.demand_tiers, metrics.avg_views as f64);
    let demand_validation = if tiered > 0.0 {
        tiered
    } else {
        cfg.demand_floor_points
    };

    let timing_bonus = timing_bonus(metrics, freshness, boost, cfg);

    let mut niche_advantage = if topic_count >= 3 {
        cfg.niche_three_topic_points
    } else if topic_count >= 2 {
        cfg.niche_two_topic_points
    } else {
        0.0
    };
    if metrics.video_count < cfg.niche_scarce_max_videos
        && metrics.avg_views >= cfg.niche_scarce_min_avg_views
    {
        niche_advantage += cfg.niche_scarce_points;
    }

    let total =
        (accessibility + demand_validation + timing_bonus + niche_advantage).clamp(0.0, 100.0);

    OpportunityBreakdown {
        accessibility,
        demand_validation,
        timing_bonus,
        niche_advantage,
        total,
    }
}

/// External timing signal plus on-platform velocity, capped.
fn timing_bonus(
    metrics: &MarketMetrics,
    freshness: &FreshnessAnalysis,
    boost: Option<&TrendsBoost>,
    cfg: &OpportunityConfig,
) -> f64 {
    let mut bonus = 0.0;

    if let Some(b) = boost {
        if b.is_breakout {
            bonus += cfg.timing_breakout_points;
        } else if b.week_over_week_growth > cfg.timing_growth_strong_pct {
            bonus += cfg.timing_growth_strong_points;
        } else if b.week_over_week_growth > cfg.timing_growth_mild_pct {
            bonus += cfg.timing_growth_mild_points;
        }
    }

    if metrics.avg_views > 0
        && freshness.recent_video_avg_views as f64
            > cfg.timing_velocity_ratio * metrics.avg_views as f64
    {
        bonus += cfg.timing_velocity_points;
    }

    bonus.min(cfg.timing_cap)
}
