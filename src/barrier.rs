//! # Competition Barrier
//! 0–100, higher = harder for a newcomer to rank. Four additive factors:
//! view barrier, incumbent advantage, supply pressure, algorithm lock-in.

use crate::config::{tier_points, BarrierConfig};
use crate::model::{FreshnessAnalysis, MarketMetrics};

/// Per-factor breakdown, kept for explainability and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierBreakdown {
    pub view_barrier: f64,
    pub incumbent_advantage: f64,
    pub supply_pressure: f64,
    pub algorithm_lockin: f64,
    pub total: f64,
}

pub fn score_barrier(
    metrics: &MarketMetrics,
    freshness: &FreshnessAnalysis,
    cfg: &BarrierConfig,
) -> BarrierBreakdown {
    let view_barrier = tier_points(&cfg.view_tiers, metrics.avg_views as f64);

    // A low share of recent uploads means incumbents own the results.
    // Inclusive bound: a 1-in-10 recent share still reads as locked up.
    let incumbent_advantage = if metrics.video_count == 0 {
        0.0
    } else {
        let recent_share = freshness.recent_video_count as f64 / metrics.video_count as f64;
        cfg.incumbent_tiers
            .iter()
            .find(|t| recent_share <= t.max_share)
            .map(|t| t.points)
            .unwrap_or(0.0)
    };

    let supply_pressure = cfg
        .supply_tiers
        .iter()
        .find(|t| metrics.video_count > t.min_count)
        .map(|t| t.points)
        .unwrap_or(0.0);

    let algorithm_lockin = if freshness.avg_age_days > cfg.lockin_min_age_days
        && freshness.recent_video_count < cfg.lockin_max_recent
    {
        cfg.lockin_points
    } else {
        0.0
    };

    let total = (view_barrier + incumbent_advantage + supply_pressure + algorithm_lockin)
        .clamp(0.0, 100.0);

    BarrierBreakdown {
        view_barrier,
        incumbent_advantage,
        supply_pressure,
        algorithm_lockin,
        total,
    }
}
