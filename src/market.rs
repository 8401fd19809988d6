//! # Market Metrics
//! Scale and velocity statistics over the relevant sample. Pure, no I/O.
//!
//! Items with unknown or non-positive view counts are dropped before any
//! averaging; `video_count` still reports the pre-filter sample size so
//! callers can see how much of the sample carried usable counters.

use crate::model::{ContentItem, MarketMetrics};
use chrono::{DateTime, Utc};

/// Age in whole days with a floor of 1, so per-day rates never divide by zero
/// and same-day uploads count as one day old.
pub fn age_days(item: &ContentItem, now: DateTime<Utc>) -> u64 {
    (now - item.published_at).num_days().max(1) as u64
}

/// Aggregate the sample into `MarketMetrics`.
pub fn aggregate_market(items: &[ContentItem], now: DateTime<Utc>) -> MarketMetrics {
    let video_count = items.len();

    let counted: Vec<&ContentItem> = items.iter().filter(|it| it.views() > 0).collect();
    if counted.is_empty() {
        return MarketMetrics {
            video_count,
            ..MarketMetrics::default()
        };
    }

    let mut views: Vec<u64> = counted.iter().map(|it| it.views()).collect();
    views.sort_unstable();

    let total_views: u64 = views.iter().sum();
    let n = views.len();
    let avg_views = (total_views as f64 / n as f64).round() as u64;
    let median_views = views[n / 2];

    // Per-item mean of views/age, not total/total: one old viral upload must
    // not drown the velocity of the rest of the sample.
    let per_day_sum: f64 = counted
        .iter()
        .map(|it| it.views() as f64 / age_days(it, now) as f64)
        .sum();
    let avg_views_per_day = (per_day_sum / n as f64).round() as u64;

    MarketMetrics {
        total_views,
        avg_views,
        median_views,
        avg_views_per_day,
        video_count,
    }
}
