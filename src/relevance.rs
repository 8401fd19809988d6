// src/relevance.rs
//! Relevance gate: decides which fetched items are actually "about" the
//! requested ingredient combination before any statistics run.
//!
//! A topic counts as present in an item's title+description when the literal
//! substring matches, the space-stripped form matches (compound-word
//! variants like "miso soup" vs "misosoup"), or, for two-word topics, both
//! words appear independently. Per-item relevance is the matched share of
//! the topic set; the required share comes from the unified match rule in
//! `RelevanceConfig::required_matches`.

use crate::config::RelevanceConfig;
use crate::model::{ContentItem, TopicSet};
use regex::Regex;
use tracing::info;

pub const ENV_DEMAND_DEV_LOG: &str = "DEMAND_DEV_LOG";

// Dev logging gate: DEMAND_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEMAND_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

// Make this helper available to other modules (e.g., /demand)
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Minimal, anonymized dev logger for relevance decisions.
fn dev_log_relevance(topics: &TopicSet, total: usize, kept: usize, required: usize) {
    if !dev_logging_enabled() {
        return;
    }
    // Never log raw topic text. Only hashed key + counts.
    let id = anon_hash(&topics.cache_key());
    info!(
        target: "relevance",
        %id, total, kept, required,
        "relevance filter"
    );
}

/// Lowercased, entity-decoded searchable text for one item.
fn searchable_text(item: &ContentItem) -> String {
    let raw = format!("{} {}", item.title, item.description);
    html_escape::decode_html_entities(&raw).to_lowercase()
}

/// True when `topic` is present in the (already lowercased) haystack.
pub fn topic_present(haystack: &str, topic: &str, min_word_len: usize) -> bool {
    if haystack.contains(topic) {
        return true;
    }

    // Compound-word variant: "miso soup" also matches "misosoup".
    if topic.contains(' ') {
        let collapsed: String = topic.split_whitespace().collect();
        if haystack.contains(&collapsed) {
            return true;
        }
    }

    // Two-word topics: both words independently is close enough, as long as
    // neither is a stopword-length fragment.
    let words: Vec<&str> = topic.split_whitespace().collect();
    if words.len() == 2 && words.iter().all(|w| w.len() >= min_word_len) {
        return words.iter().all(|w| word_present(haystack, w));
    }

    false
}

/// Whole-word presence (Unicode word boundaries), so "rice" does not match
/// inside "ricecake".
fn word_present(haystack: &str, word: &str) -> bool {
    let pattern = format!(r"(?u)\b{}\b", regex::escape(word));
    Regex::new(&pattern)
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

/// Number of topics from the set present in the item.
pub fn matched_topic_count(item: &ContentItem, topics: &TopicSet, cfg: &RelevanceConfig) -> usize {
    let haystack = searchable_text(item);
    topics
        .topics()
        .iter()
        .filter(|t| topic_present(&haystack, t, cfg.min_word_len))
        .count()
}

/// Keep only items that clear the required-match floor for this set size.
pub fn filter_relevant(
    items: &[ContentItem],
    topics: &TopicSet,
    cfg: &RelevanceConfig,
) -> Vec<ContentItem> {
    let required = cfg.required_matches(topics.len());
    let kept: Vec<ContentItem> = items
        .iter()
        .filter(|it| matched_topic_count(it, topics, cfg) >= required)
        .cloned()
        .collect();
    dev_log_relevance(topics, items.len(), kept.len(), required);
    kept
}
