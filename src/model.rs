//! model.rs — Value objects shared by the demand pipeline and the gap miner.
//!
//! Everything here is an immutable snapshot: items arrive from the tagging
//! collaborator, results go out as plain JSON. Output shapes serialize with
//! camelCase keys because the insights surface consumes them verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One tagged content item as produced by the upstream extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    /// `None` when the platform hides the counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    pub published_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Topic tags with extraction confidence; may be absent entirely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TopicTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTag {
    pub name: String,
    /// Extraction confidence in [0,1].
    pub confidence: f32,
}

impl ContentItem {
    /// Views as a plain number; unknown counters count as zero.
    pub fn views(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }

    /// Tag names at or above the given confidence, lowercased.
    pub fn confident_tags(&self, min_confidence: f32) -> Vec<String> {
        self.tags
            .iter()
            .filter(|t| t.confidence >= min_confidence)
            .map(|t| t.name.trim().to_lowercase())
            .collect()
    }
}

/// Rejection reasons for a caller-supplied topic list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicSetError {
    Empty,
    TooMany(usize),
    BlankEntry,
}

impl fmt::Display for TopicSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicSetError::Empty => write!(f, "topic list must not be empty"),
            TopicSetError::TooMany(n) => write!(f, "topic list has {n} entries, maximum is 5"),
            TopicSetError::BlankEntry => write!(f, "topic entries must not be blank"),
        }
    }
}

impl std::error::Error for TopicSetError {}

/// Ordered list of 1–5 normalized topic strings. Construction is the only
/// boundary validation in the crate; everything past it trusts the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopicSet(Vec<String>);

impl TopicSet {
    pub const MAX_TOPICS: usize = 5;

    pub fn new<I, S>(topics: I) -> Result<Self, TopicSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = topics
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .collect();
        if normalized.is_empty() {
            return Err(TopicSetError::Empty);
        }
        if normalized.len() > Self::MAX_TOPICS {
            return Err(TopicSetError::TooMany(normalized.len()));
        }
        if normalized.iter().any(|t| t.is_empty()) {
            return Err(TopicSetError::BlankEntry);
        }
        Ok(Self(normalized))
    }

    pub fn topics(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.0.iter().any(|t| t == topic)
    }

    /// Sorted, joined key used for caching and anonymized logging.
    pub fn cache_key(&self) -> String {
        let mut sorted = self.0.clone();
        sorted.sort();
        sorted.join("+")
    }

    /// A copy of this set with one extra topic appended (gap-miner lookups).
    pub fn with_topic(&self, extra: &str) -> Self {
        let mut topics = self.0.clone();
        topics.push(extra.trim().to_lowercase());
        Self(topics)
    }
}

/// Scale and velocity statistics over the relevant sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub total_views: u64,
    pub avg_views: u64,
    pub median_views: u64,
    pub avg_views_per_day: u64,
    pub video_count: usize,
}

/// How concentrated success is among top performers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityDistribution {
    pub top_performer_views: u64,
    pub bottom_performer_views: u64,
    /// top/bottom mean ratio, capped at 100.
    pub outlier_ratio: f64,
}

/// Recency mix of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessAnalysis {
    pub avg_age_days: u64,
    pub recent_video_count: usize,
    pub recent_video_avg_views: u64,
    pub is_emerging_topic: bool,
}

/// Optional external search-interest signal. Absence degrades quality,
/// never correctness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsBoost {
    /// Interest level in [0,100].
    pub interest_score: f64,
    /// Week-over-week growth in percent, signed.
    pub week_over_week_growth: f64,
    pub is_breakout: bool,
}

/// Competitive-opportunity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Underserved,
    Saturated,
    Balanced,
    Emerging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGap {
    /// Opportunity score in [0,100].
    pub score: u8,
    #[serde(rename = "type")]
    pub gap_type: GapType,
    pub reasoning: String,
}

/// Discrete audience-interest label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandBand {
    Hot,
    Growing,
    Stable,
    Niche,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One human-readable suggestion attached to a demand signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOpportunity {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl ContentOpportunity {
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            description: description.into(),
            priority,
        }
    }
}

/// Full result of `compute_demand_signal`. Always fully populated; sparsity
/// shows up as low confidence and sentinel bands, not as missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandSignal {
    pub demand_score: u8,
    pub demand_band: DemandBand,
    pub market_metrics: MarketMetrics,
    pub content_gap: ContentGap,
    #[serde(default)]
    pub opportunities: Vec<ContentOpportunity>,
    /// Trust in the signal, [0,1].
    pub confidence: f32,
    pub sample_size: usize,
}

/// One mined adjacent-topic candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientGap {
    pub ingredient: String,
    pub co_occurrence_count: usize,
    /// Items covering base set + candidate (existing-coverage signal).
    pub video_count: u64,
    pub gap_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand_band: Option<DemandBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends_insight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends_growth: Option<f64>,
    #[serde(default)]
    pub is_breakout: bool,
}

/// Wire shape returned by `find_content_gaps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub base_topics: Vec<String>,
    pub gaps: Vec<IngredientGap>,
    pub total_videos: usize,
    pub source: String,
}

/// Tag for gap reports mined from the tagged-recipe catalog.
pub const GAP_SOURCE_RECIPE_ANALYSIS: &str = "recipe_analysis";

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

/// Clamp a float score into [0,100] and round to the nearest integer.
pub(crate) fn round_score(x: f64) -> u8 {
    x.round().clamp(0.0, 100.0) as u8
}
