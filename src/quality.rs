//! # Quality Distribution
//! How concentrated success is among top performers: mean of the top
//! `ceil(10%)` against the mean of the bottom `ceil(50%)`, expressed as a
//! ratio capped at 100.

use crate::config::QualityConfig;
use crate::model::{ContentItem, QualityDistribution};

pub fn analyze_quality(items: &[ContentItem], cfg: &QualityConfig) -> QualityDistribution {
    let mut views: Vec<u64> = items
        .iter()
        .map(|it| it.views())
        .filter(|v| *v > 0)
        .collect();
    views.sort_unstable_by(|a, b| b.cmp(a));

    if views.len() < cfg.min_sample {
        // Too small for a distribution: report the endpoints, no ratio.
        return QualityDistribution {
            top_performer_views: views.first().copied().unwrap_or(0),
            bottom_performer_views: views.last().copied().unwrap_or(0),
            outlier_ratio: 0.0,
        };
    }

    let n = views.len();
    let top_n = ((n as f64 * cfg.top_fraction).ceil() as usize).max(1);
    let bottom_n = ((n as f64 * cfg.bottom_fraction).ceil() as usize).max(1);

    let top_mean = mean(&views[..top_n]);
    let bottom_mean = mean(&views[n - bottom_n..]);

    let outlier_ratio = if bottom_mean == 0 {
        if top_mean > 0 {
            cfg.outlier_cap
        } else {
            0.0
        }
    } else {
        (top_mean as f64 / bottom_mean as f64).min(cfg.outlier_cap)
    };

    QualityDistribution {
        top_performer_views: top_mean,
        bottom_performer_views: bottom_mean,
        outlier_ratio,
    }
}

fn mean(views: &[u64]) -> u64 {
    if views.is_empty() {
        return 0;
    }
    let sum: u64 = views.iter().sum();
    (sum as f64 / views.len() as f64).round() as u64
}
