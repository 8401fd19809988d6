//! Injected demand-signal cache with explicit lifecycle. Keys are the
//! normalized sorted topic key (`TopicSet::cache_key`). The TTL
//! implementation guarantees at-most-one concurrent recomputation per key:
//! concurrent callers of `get_or_compute` for the same key serialize on a
//! per-key lock and all but the first get the freshly cached value.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use tokio::sync::{Mutex, RwLock};

use crate::model::DemandSignal;

#[async_trait::async_trait]
pub trait DemandCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<DemandSignal>;
    async fn insert(&self, key: &str, signal: DemandSignal);
    /// Manual invalidation hook for administrators.
    async fn invalidate(&self, key: &str);
    async fn invalidate_all(&self);
}

pub type DynDemandCache = Arc<TtlDemandCache>;

/// Fixed-TTL in-memory cache with per-key single-flight.
pub struct TtlDemandCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

struct Entry {
    signal: DemandSignal,
    inserted_at: Instant,
}

impl TtlDemandCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Cached value, or compute-and-cache under the per-key lock. The
    /// compute closure runs at most once per key per TTL window no matter
    /// how many callers race.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> DemandSignal
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DemandSignal>,
    {
        if let Some(hit) = self.get(key).await {
            counter!("demand_cache_hits_total").increment(1);
            return hit;
        }

        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;

        // Double-check: a racing caller may have filled the slot while we
        // waited for the lock.
        if let Some(hit) = self.get(key).await {
            counter!("demand_cache_hits_total").increment(1);
            return hit;
        }

        counter!("demand_cache_misses_total").increment(1);
        let fresh = compute().await;
        self.insert(key, fresh.clone()).await;
        fresh
    }
}

#[async_trait::async_trait]
impl DemandCache for TtlDemandCache {
    async fn get(&self, key: &str) -> Option<DemandSignal> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        // Absolute TTL, no sliding refresh.
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.signal.clone())
    }

    async fn insert(&self, key: &str, signal: DemandSignal) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                signal,
                inserted_at: Instant::now(),
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    async fn invalidate_all(&self) {
        self.entries.write().await.clear();
        self.key_locks.lock().await.clear();
    }
}
