//! Prometheus wiring for the demand analyzer. The recorder installs once per
//! process; request/cache/trends series are zero-initialized here so scrapes
//! see every series from the first request, not only after traffic.

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counter names bumped by the API, cache, and trends layers.
pub const REQUESTS_DEMAND: &str = "demand_requests_total";
pub const REQUESTS_GAPS: &str = "gap_requests_total";
pub const CACHE_HITS: &str = "demand_cache_hits_total";
pub const CACHE_MISSES: &str = "demand_cache_misses_total";
pub const TRENDS_FALLBACKS: &str = "trends_fallback_total";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and register this service's series.
    pub fn init(cache_ttl_ms: u64) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        describe_counter!(REQUESTS_DEMAND, "Demand-signal requests received");
        describe_counter!(REQUESTS_GAPS, "Gap-mining requests received");
        describe_counter!(CACHE_HITS, "Demand cache hits");
        describe_counter!(CACHE_MISSES, "Demand cache misses (recomputations)");
        describe_counter!(
            TRENDS_FALLBACKS,
            "Trends lookups degraded to no boost (failure or quota)"
        );
        for name in [
            REQUESTS_DEMAND,
            REQUESTS_GAPS,
            CACHE_HITS,
            CACHE_MISSES,
            TRENDS_FALLBACKS,
        ] {
            counter!(name).absolute(0);
        }

        describe_gauge!(
            "demand_cache_ttl_ms",
            "Configured TTL of the demand-signal cache (absolute, no sliding refresh)"
        );
        gauge!("demand_cache_ttl_ms").set(cache_ttl_ms as f64);

        Self { handle }
    }

    /// Router exposing `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
