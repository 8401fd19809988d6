//! # Freshness
//! Recency mix of the sample and the emerging-topic call: a topic is
//! emerging when a meaningful share of the sample is recent AND recent
//! uploads pull at least half the views of older ones.

use crate::config::FreshnessConfig;
use crate::market::age_days;
use crate::model::{ContentItem, FreshnessAnalysis};
use chrono::{DateTime, Utc};

pub fn analyze_freshness(
    items: &[ContentItem],
    now: DateTime<Utc>,
    cfg: &FreshnessConfig,
) -> FreshnessAnalysis {
    if items.is_empty() {
        return FreshnessAnalysis::default();
    }

    let mut recent: Vec<&ContentItem> = Vec::new();
    let mut older: Vec<&ContentItem> = Vec::new();
    for it in items {
        if (now - it.published_at).num_days() < cfg.recent_days {
            recent.push(it);
        } else {
            older.push(it);
        }
    }

    let age_sum: u64 = items.iter().map(|it| age_days(it, now)).sum();
    let avg_age_days = (age_sum as f64 / items.len() as f64).round() as u64;

    let recent_avg = mean_views(&recent);
    let older_avg = mean_views(&older);

    let enough_recent =
        recent.len() as f64 >= cfg.emerging_recent_share * items.len() as f64;
    // No older items → the velocity condition is vacuously satisfied.
    let recent_velocity_ok =
        older_avg == 0 || recent_avg as f64 >= cfg.emerging_velocity_ratio * older_avg as f64;

    FreshnessAnalysis {
        avg_age_days,
        recent_video_count: recent.len(),
        recent_video_avg_views: recent_avg,
        is_emerging_topic: enough_recent && recent_velocity_ok,
    }
}

fn mean_views(items: &[&ContentItem]) -> u64 {
    if items.is_empty() {
        return 0;
    }
    let sum: u64 = items.iter().map(|it| it.views()).sum();
    (sum as f64 / items.len() as f64).round() as u64
}
