// src/catalog.rs
//! Storage collaborator contract: the gap miner pulls its candidate pool and
//! its combined-coverage counts from here. The real index lives in the
//! platform backend; `InMemoryCatalog` serves tests and local runs.

use crate::config::RelevanceConfig;
use crate::model::{ContentItem, TopicSet};
use crate::relevance::matched_topic_count;
use anyhow::Result;

#[async_trait::async_trait]
pub trait CatalogIndex: Send + Sync {
    /// Highest-viewed items carrying at least one tag at or above the given
    /// confidence, capped at `limit`, views at or above `min_views`.
    async fn top_tagged_items(
        &self,
        limit: usize,
        min_views: u64,
        min_tag_confidence: f32,
    ) -> Result<Vec<ContentItem>>;

    /// How many catalog items cover every topic in the set. This is the
    /// literal existing-coverage signal for a base+candidate combination.
    async fn count_matching(&self, topics: &TopicSet) -> Result<u64>;

    fn name(&self) -> &'static str;
}

/// Simple whole-catalog-in-memory implementation.
pub struct InMemoryCatalog {
    items: Vec<ContentItem>,
    relevance: RelevanceConfig,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self {
            items,
            relevance: RelevanceConfig::default(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogIndex for InMemoryCatalog {
    async fn top_tagged_items(
        &self,
        limit: usize,
        min_views: u64,
        min_tag_confidence: f32,
    ) -> Result<Vec<ContentItem>> {
        let mut pool: Vec<ContentItem> = self
            .items
            .iter()
            .filter(|it| it.views() >= min_views)
            .filter(|it| it.tags.iter().any(|t| t.confidence >= min_tag_confidence))
            .cloned()
            .collect();
        pool.sort_by(|a, b| b.views().cmp(&a.views()).then(a.id.cmp(&b.id)));
        pool.truncate(limit);
        Ok(pool)
    }

    async fn count_matching(&self, topics: &TopicSet) -> Result<u64> {
        let n = self
            .items
            .iter()
            .filter(|it| matched_topic_count(it, topics, &self.relevance) == topics.len())
            .count();
        Ok(n as u64)
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
