use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::cache::{DemandCache, DynDemandCache, TtlDemandCache};
use crate::catalog::{CatalogIndex, InMemoryCatalog};
use crate::config::HotReloadConfig;
use crate::engine::compute_demand_signal;
use crate::gaps::find_content_gaps;
use crate::history::History;
use crate::model::{ContentItem, GapReport, TopicSet, TopicSetError};
use crate::relevance::anon_hash;
use crate::trends::{build_trends_provider, DynTrendsProvider};

pub const ENV_DEMAND_CACHE_TTL_MS: &str = "DEMAND_CACHE_TTL_MS";
const DEFAULT_CACHE_TTL_MS: u64 = 600_000;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogIndex>,
    pub trends: DynTrendsProvider,
    pub cache: DynDemandCache,
    pub config: Arc<HotReloadConfig>,
    pub history: Arc<History>,
}

impl AppState {
    /// State wired from the environment with an empty in-memory catalog.
    /// Real deployments swap in the platform-backed index.
    pub fn from_env() -> Self {
        Self::with_catalog(Arc::new(InMemoryCatalog::new(Vec::new())))
    }

    pub fn with_catalog(catalog: Arc<dyn CatalogIndex>) -> Self {
        let ttl_ms = std::env::var(ENV_DEMAND_CACHE_TTL_MS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_MS);
        Self {
            catalog,
            trends: build_trends_provider(),
            cache: Arc::new(TtlDemandCache::new(Duration::from_millis(ttl_ms))),
            config: Arc::new(HotReloadConfig::new(None)),
            history: Arc::new(History::with_capacity(2000)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/demand", post(demand))
        .route("/gaps", post(gaps))
        .route("/debug/history", get(debug_history))
        .route("/debug/last-signal", get(debug_last_signal))
        .route("/debug/config", get(debug_config))
        .route("/admin/invalidate-cache", post(admin_invalidate_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct DemandReq {
    items: Vec<ContentItem>,
    topics: Vec<String>,
}

#[derive(serde::Deserialize)]
struct GapsReq {
    topics: Vec<String>,
}

/// 400 with a JSON body; the only error callers ever see.
fn bad_request(e: TopicSetError) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
}

async fn demand(State(state): State<AppState>, Json(body): Json<DemandReq>) -> Response {
    counter!("demand_requests_total").increment(1);

    let topics = match TopicSet::new(body.topics) {
        Ok(t) => t,
        Err(e) => return bad_request(e),
    };
    let key = topics.cache_key();

    // HIT when the cached value is still fresh; otherwise compute under the
    // per-key lock so racing callers recompute at most once.
    let (signal, cache_state) = match state.cache.get(&key).await {
        Some(hit) => (hit, "HIT"),
        None => {
            let computed = state
                .cache
                .get_or_compute(&key, || async {
                    let boost = state.trends.boost(&topics).await;
                    let cfg = state.config.current();
                    compute_demand_signal(&body.items, &topics, boost.as_ref(), Utc::now(), &cfg)
                })
                .await;
            (computed, "MISS")
        }
    };

    state.history.push(anon_hash(&key), &signal);
    ([("x-demand-cache", cache_state)], Json(signal)).into_response()
}

async fn gaps(State(state): State<AppState>, Json(body): Json<GapsReq>) -> Response {
    counter!("gap_requests_total").increment(1);

    let topics = match TopicSet::new(body.topics) {
        Ok(t) => t,
        Err(e) => return bad_request(e),
    };

    let cfg = state.config.current();
    let cache: Arc<dyn DemandCache> = state.cache.clone();
    match find_content_gaps(state.catalog.clone(), state.trends.clone(), cache, &topics, &cfg).await
    {
        Ok(report) => Json::<GapReport>(report).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "gap mining failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "catalog unavailable" })),
            )
                .into_response()
        }
    }
}

#[derive(serde::Serialize)]
struct HistoryOut {
    ts_unix: u64,
    key: String,
    band: String,
    gap_type: String,
    demand_score: u8,
    confidence: f32,
    sample_size: usize,
}

impl From<crate::history::HistoryEntry> for HistoryOut {
    fn from(h: crate::history::HistoryEntry) -> Self {
        Self {
            ts_unix: h.ts_unix,
            key: h.key_hash,
            band: format!("{:?}", h.band).to_lowercase(),
            gap_type: format!("{:?}", h.gap_type).to_lowercase(),
            demand_score: h.demand_score,
            confidence: h.confidence,
            sample_size: h.sample_size,
        }
    }
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryOut>> {
    let rows = state.history.snapshot_last_n(10);
    Json(rows.into_iter().map(HistoryOut::from).collect())
}

async fn debug_last_signal(State(state): State<AppState>) -> Json<Option<HistoryOut>> {
    let mut rows = state.history.snapshot_last_n(1);
    Json(rows.pop().map(HistoryOut::from))
}

async fn debug_config(State(state): State<AppState>) -> Json<crate::config::ScoringConfig> {
    Json(state.config.current().as_ref().clone())
}

#[derive(serde::Deserialize)]
struct InvalidateQuery {
    key: Option<String>,
}

async fn admin_invalidate_cache(
    State(state): State<AppState>,
    Query(q): Query<InvalidateQuery>,
) -> String {
    match q.key {
        Some(key) => {
            state.cache.invalidate(&key).await;
            format!("invalidated '{key}'")
        }
        None => {
            state.cache.invalidate_all().await;
            "cleared".to_string()
        }
    }
}

