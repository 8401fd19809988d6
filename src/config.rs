//! Scoring configuration: every numeric threshold the pipeline consults,
//! lifted into one versioned structure so tiers can be tuned (and unit
//! tested) without touching control flow.
//!
//! Loaded from `config/scoring.toml` (override via `SCORING_CONFIG_PATH`).
//! Missing file or parse failure falls back to compiled defaults, which
//! reproduce the production tuning exactly.
//!
//! On each `current()` call the hot-reload handle checks the file's modified
//! time and reloads if it changed.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};
use tracing::info;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";

/// A `(threshold, points)` step of a descending tier table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tier {
    pub min: f64,
    pub points: f64,
}

/// Walk a descending tier table and return the first matching step.
pub fn tier_points(tiers: &[Tier], value: f64) -> f64 {
    for t in tiers {
        if value >= t.min {
            return t.points;
        }
    }
    0.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelevanceConfig {
    /// Words shorter than this are ignored by the split-word match.
    pub min_word_len: usize,
    /// Below this many relevant items the pipeline short-circuits.
    pub min_sample: usize,
    /// Gap score reported by the sentinel when at least one item matched.
    pub sentinel_gap_score: u8,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            min_word_len: 3,
            min_sample: 3,
            sentinel_gap_score: 80,
        }
    }
}

impl RelevanceConfig {
    /// Unified required-match rule shared with the gap miner: a single topic
    /// must match exactly; larger sets need `max(2, ceil(n/2))` matches.
    pub fn required_matches(&self, topic_count: usize) -> usize {
        if topic_count <= 1 {
            1
        } else {
            2.max(topic_count.div_ceil(2))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QualityConfig {
    /// Share of the sample treated as top performers (ceil, at least 1).
    pub top_fraction: f64,
    /// Share of the sample treated as the long tail.
    pub bottom_fraction: f64,
    pub outlier_cap: f64,
    pub min_sample: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            top_fraction: 0.10,
            bottom_fraction: 0.50,
            outlier_cap: 100.0,
            min_sample: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FreshnessConfig {
    pub recent_days: i64,
    /// Recent share of the sample required for an emerging call.
    pub emerging_recent_share: f64,
    /// Recent average must reach this multiple of the older average.
    pub emerging_velocity_ratio: f64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            recent_days: 90,
            emerging_recent_share: 0.30,
            emerging_velocity_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BarrierConfig {
    /// Average-view tiers, descending.
    pub view_tiers: Vec<Tier>,
    /// Recent-share tiers, ascending by rarity: share *at or below* `max` scores.
    pub incumbent_tiers: Vec<IncumbentTier>,
    /// Video-count tiers, descending: count *above* `min` scores.
    pub supply_tiers: Vec<SupplyTier>,
    pub lockin_min_age_days: u64,
    pub lockin_max_recent: usize,
    pub lockin_points: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct IncumbentTier {
    pub max_share: f64,
    pub points: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SupplyTier {
    pub min_count: usize,
    pub points: f64,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            view_tiers: vec![
                Tier { min: 1_000_000.0, points: 40.0 },
                Tier { min: 500_000.0, points: 35.0 },
                Tier { min: 100_000.0, points: 30.0 },
                Tier { min: 50_000.0, points: 20.0 },
                Tier { min: 10_000.0, points: 10.0 },
            ],
            incumbent_tiers: vec![
                IncumbentTier { max_share: 0.10, points: 30.0 },
                IncumbentTier { max_share: 0.20, points: 20.0 },
                IncumbentTier { max_share: 0.40, points: 10.0 },
            ],
            supply_tiers: vec![
                SupplyTier { min_count: 50, points: 20.0 },
                SupplyTier { min_count: 30, points: 15.0 },
                SupplyTier { min_count: 15, points: 10.0 },
                SupplyTier { min_count: 5, points: 5.0 },
            ],
            lockin_min_age_days: 365,
            lockin_max_recent: 3,
            lockin_points: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpportunityConfig {
    /// Barrier tiers, ascending: barrier *at or below* `max` scores.
    pub accessibility_tiers: Vec<AccessTier>,
    /// Average-view tiers, descending.
    pub demand_tiers: Vec<Tier>,
    /// Floor awarded when no demand tier matches.
    pub demand_floor_points: f64,
    pub timing_breakout_points: f64,
    pub timing_growth_strong_pct: f64,
    pub timing_growth_strong_points: f64,
    pub timing_growth_mild_pct: f64,
    pub timing_growth_mild_points: f64,
    /// Recent average must exceed this multiple of the overall average.
    pub timing_velocity_ratio: f64,
    pub timing_velocity_points: f64,
    pub timing_cap: f64,
    pub niche_three_topic_points: f64,
    pub niche_two_topic_points: f64,
    pub niche_scarce_max_videos: usize,
    pub niche_scarce_min_avg_views: u64,
    pub niche_scarce_points: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccessTier {
    pub max_barrier: f64,
    pub points: f64,
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            accessibility_tiers: vec![
                AccessTier { max_barrier: 20.0, points: 35.0 },
                AccessTier { max_barrier: 40.0, points: 28.0 },
                AccessTier { max_barrier: 60.0, points: 18.0 },
                AccessTier { max_barrier: 80.0, points: 8.0 },
            ],
            demand_tiers: vec![
                Tier { min: 50_000.0, points: 25.0 },
                Tier { min: 20_000.0, points: 20.0 },
                Tier { min: 10_000.0, points: 15.0 },
                Tier { min: 5_000.0, points: 10.0 },
            ],
            demand_floor_points: 5.0,
            timing_breakout_points: 15.0,
            timing_growth_strong_pct: 30.0,
            timing_growth_strong_points: 10.0,
            timing_growth_mild_pct: 10.0,
            timing_growth_mild_points: 5.0,
            timing_velocity_ratio: 1.2,
            timing_velocity_points: 10.0,
            timing_cap: 25.0,
            niche_three_topic_points: 10.0,
            niche_two_topic_points: 5.0,
            niche_scarce_max_videos: 10,
            niche_scarce_min_avg_views: 10_000,
            niche_scarce_points: 5.0,
        }
    }
}

/// Weight set for the composite demand score. Two variants exist: with an
/// external trends signal the view/gap/velocity buckets shrink to make room
/// for the trends bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DemandWeights {
    pub view_cap: f64,
    pub gap_weight: f64,
    pub velocity_cap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemandConfig {
    pub weights_plain: DemandWeights,
    pub weights_with_trends: DemandWeights,
    /// log10(avgViews) that earns the full view cap.
    pub view_full_log10: f64,
    /// log10(avgViewsPerDay) that earns the full velocity cap.
    pub velocity_full_log10: f64,
    pub emerging_bonus: f64,
    pub fresh_bonus: f64,
    pub trends_interest_divisor: f64,
    pub trends_interest_cap: f64,
    pub trends_growth_tiers: Vec<Tier>,
    pub trends_breakout_bonus: f64,
    pub band_hot: u8,
    pub band_growing: u8,
    pub band_stable: u8,
    /// Below this many videos an off-scale score reads `unknown`, not `niche`.
    pub min_band_sample: usize,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            weights_plain: DemandWeights {
                view_cap: 40.0,
                gap_weight: 0.35,
                velocity_cap: 15.0,
            },
            weights_with_trends: DemandWeights {
                view_cap: 30.0,
                gap_weight: 0.30,
                velocity_cap: 10.0,
            },
            view_full_log10: 6.0,
            velocity_full_log10: 4.0,
            emerging_bonus: 10.0,
            fresh_bonus: 5.0,
            trends_interest_divisor: 10.0,
            trends_interest_cap: 10.0,
            trends_growth_tiers: vec![
                Tier { min: 50.0, points: 5.0 },
                Tier { min: 20.0, points: 3.0 },
                Tier { min: f64::MIN_POSITIVE, points: 1.0 },
            ],
            trends_breakout_bonus: 5.0,
            band_hot: 75,
            band_growing: 55,
            band_stable: 35,
            min_band_sample: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base_cap: f32,
    pub sample_divisor: f32,
    pub avg_views_bonus_min: u64,
    pub video_count_bonus_min: usize,
    pub bonus: f32,
    pub interest_extra_min: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base_cap: 0.6,
            sample_divisor: 25.0,
            avg_views_bonus_min: 10_000,
            video_count_bonus_min: 10,
            bonus: 0.1,
            interest_extra_min: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SuggestConfig {
    /// outlierRatio floor for a quality-gap call.
    pub quality_outlier_min: f64,
    /// Bottom performers must sit below this share of the top mean.
    pub quality_bottom_share: f64,
    /// Outlier ratio at which the quality gap reads high priority.
    pub quality_high_outlier: f64,
    pub fresh_max_recent: usize,
    pub fresh_min_avg_views: u64,
    pub fresh_max_avg_views: u64,
    pub fresh_max_videos: usize,
    /// Gap score at which an underserved call reads high priority.
    pub underserved_high_score: u8,
    pub trending_min_recent_avg: u64,
    pub velocity_growth_pct: f64,
    pub velocity_high_growth_pct: f64,
    pub velocity_max_recent: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            quality_outlier_min: 15.0,
            quality_bottom_share: 0.10,
            quality_high_outlier: 30.0,
            fresh_max_recent: 3,
            fresh_min_avg_views: 30_000,
            fresh_max_avg_views: 300_000,
            fresh_max_videos: 15,
            underserved_high_score: 60,
            trending_min_recent_avg: 10_000,
            velocity_growth_pct: 30.0,
            velocity_high_growth_pct: 60.0,
            velocity_max_recent: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GapMiningConfig {
    /// Pool size pulled from the catalog (highest-viewed first).
    pub pool_limit: usize,
    pub pool_min_views: u64,
    pub tag_min_confidence: f32,
    /// Hard floor: below this many surviving items no gaps are computed.
    pub min_surviving: usize,
    /// Candidate floor: min(`cap`, ceil(`fraction` × survivors)).
    pub min_occurrence_cap: usize,
    pub min_occurrence_fraction: f64,
    pub perf_strong_avg_views: u64,
    pub perf_strong_multiplier: f64,
    pub perf_good_avg_views: u64,
    pub perf_good_multiplier: f64,
    pub trends_breakout_multiplier: f64,
    pub trends_growth_strong_pct: f64,
    pub trends_growth_strong_multiplier: f64,
    pub trends_growth_mild_pct: f64,
    pub trends_growth_mild_multiplier: f64,
    pub trends_decline_pct: f64,
    pub trends_decline_multiplier: f64,
    pub max_gaps: usize,
    /// Bounded fan-out for per-candidate lookups.
    pub lookup_concurrency: usize,
}

impl Default for GapMiningConfig {
    fn default() -> Self {
        Self {
            pool_limit: 100,
            pool_min_views: 1_000,
            tag_min_confidence: 0.6,
            min_surviving: 5,
            min_occurrence_cap: 3,
            min_occurrence_fraction: 0.15,
            perf_strong_avg_views: 100_000,
            perf_strong_multiplier: 1.5,
            perf_good_avg_views: 50_000,
            perf_good_multiplier: 1.25,
            trends_breakout_multiplier: 2.0,
            trends_growth_strong_pct: 30.0,
            trends_growth_strong_multiplier: 1.5,
            trends_growth_mild_pct: 10.0,
            trends_growth_mild_multiplier: 1.25,
            trends_decline_pct: -20.0,
            trends_decline_multiplier: 0.75,
            max_gaps: 10,
            lookup_concurrency: 8,
        }
    }
}

impl GapMiningConfig {
    /// Minimum co-occurrence count a candidate must reach.
    pub fn min_occurrences(&self, surviving: usize) -> usize {
        let scaled = (self.min_occurrence_fraction * surviving as f64).ceil() as usize;
        self.min_occurrence_cap.min(scaled.max(1))
    }
}

/// Root configuration, one section per scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub relevance: RelevanceConfig,
    pub quality: QualityConfig,
    pub freshness: FreshnessConfig,
    pub barrier: BarrierConfig,
    pub opportunity: OpportunityConfig,
    pub demand: DemandConfig,
    pub confidence: ConfidenceConfig,
    pub suggest: SuggestConfig,
    pub gaps: GapMiningConfig,
}

impl ScoringConfig {
    /// Load from a TOML file, falling back to defaults on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(s) => match toml::from_str(&s) {
                Ok(cfg) => cfg,
                Err(e) => {
                    info!(error = %e, "scoring config parse failed, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Resolve the config path from the environment.
    pub fn default_path() -> PathBuf {
        std::env::var(ENV_SCORING_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCORING_CONFIG_PATH))
    }
}

/// Strict loader for tests and tools (no fallback).
pub fn load_scoring_file(path: &Path) -> io::Result<ScoringConfig> {
    let s = fs::read_to_string(path)?;
    toml::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Hot-reload wrapper: reloads when the config file mtime changes.
#[derive(Debug)]
pub struct HotReloadConfig {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug)]
struct State {
    config: Arc<ScoringConfig>,
    last_modified: Option<SystemTime>,
}

impl HotReloadConfig {
    pub fn new(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(ScoringConfig::default_path);
        let config = Arc::new(ScoringConfig::load_from_file(&path));
        Self {
            path,
            inner: RwLock::new(State {
                config,
                last_modified: None,
            }),
        }
    }

    /// Get the latest config, reloading if the file changed.
    pub fn current(&self) -> Arc<ScoringConfig> {
        let needs_reload = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => {
                let guard = self.inner.read().expect("scoring config lock poisoned");
                guard.last_modified != Some(mtime)
            }
            // If the file isn't there, keep what we have; no reload.
            Err(_) => false,
        };

        if !needs_reload {
            return self.inner.read().expect("scoring config lock poisoned").config.clone();
        }

        let mut guard = self.inner.write().expect("scoring config lock poisoned");
        // Double-check in case of races.
        if let Ok(mtime) = fs::metadata(&self.path).and_then(|m| m.modified()) {
            if guard.last_modified != Some(mtime) {
                guard.config = Arc::new(ScoringConfig::load_from_file(&self.path));
                guard.last_modified = Some(mtime);
            }
        }
        guard.config.clone()
    }
}
