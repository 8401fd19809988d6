// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod barrier;
pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod demand;
pub mod engine;
pub mod freshness;
pub mod gaps;
pub mod history;
pub mod market;
pub mod metrics;
pub mod model;
pub mod opportunity;
pub mod quality;
pub mod relevance;
pub mod suggest;
pub mod trends;

// ---- Re-exports for stable public API ----
// Convenient access to the two core operations and the router:
// `crate_root::compute_demand_signal`, `crate_root::find_content_gaps`,
// `crate_root::api::create_router` and `crate_root::app`.
pub use crate::engine::compute_demand_signal;
pub use crate::gaps::find_content_gaps;
pub use crate::model::{
    ContentGap, ContentItem, ContentOpportunity, DemandBand, DemandSignal, GapReport, GapType,
    IngredientGap, MarketMetrics, TopicSet, TopicSetError, TrendsBoost,
};

use axum::Router;
use once_cell::sync::OnceCell;
use tracing::info;

/// Prometheus recorder can only install once per process; keep the handle
/// around so repeated `app()` calls (tests) reuse it.
static PROMETHEUS: OnceCell<crate::metrics::Metrics> = OnceCell::new();

pub const ENV_DEMAND_METRICS: &str = "DEMAND_METRICS";

/// Build the full application router from environment-driven state.
/// Used by the Shuttle entrypoint and by HTTP-level integration tests.
pub async fn app() -> anyhow::Result<Router> {
    let state = api::AppState::from_env();
    info!(
        trends = state.trends.name(),
        cache_ttl_ms = state.cache.ttl().as_millis() as u64,
        "demand analyzer state ready"
    );

    let mut router = api::create_router(state.clone());
    if std::env::var(ENV_DEMAND_METRICS).ok().as_deref() == Some("1") {
        let prom = PROMETHEUS
            .get_or_init(|| crate::metrics::Metrics::init(state.cache.ttl().as_millis() as u64));
        router = router.merge(prom.router());
    }
    Ok(router)
}
