//! Search-interest collaborator: provider abstraction + in-memory daily
//! quota. The upstream service is rate-limited and flaky by nature, so every
//! failure path degrades to "no boost" — unavailability of this signal
//! lowers result quality, never correctness.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use metrics::counter;
use serde::Deserialize;
use tracing::debug;

use crate::model::{TopicSet, TrendsBoost};

pub const ENV_TRENDS_TEST_MODE: &str = "TRENDS_TEST_MODE";
pub const ENV_TRENDS_API_URL: &str = "TRENDS_API_URL";
pub const ENV_TRENDS_API_KEY: &str = "TRENDS_API_KEY";
pub const ENV_TRENDS_DAILY_LIMIT: &str = "TRENDS_DAILY_LIMIT";

const DEFAULT_DAILY_LIMIT: u32 = 500;

#[async_trait::async_trait]
pub trait TrendsProvider: Send + Sync {
    /// `None` on failure, quota exhaustion, or when the provider is disabled.
    async fn boost(&self, topics: &TopicSet) -> Option<TrendsBoost>;
    /// Provider name for diagnostics/headers.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynTrendsProvider = Arc<dyn TrendsProvider>;

/// Factory: build a provider according to environment variables.
///
/// * If `TRENDS_TEST_MODE=mock`, returns a deterministic mock provider.
/// * Else if `TRENDS_API_URL` is set, builds the real HTTP provider wrapped
///   with the daily quota.
/// * Else returns a disabled provider.
pub fn build_trends_provider() -> DynTrendsProvider {
    if std::env::var(ENV_TRENDS_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockTrends::default());
    }

    match std::env::var(ENV_TRENDS_API_URL) {
        Ok(base_url) if !base_url.is_empty() => {
            let daily_limit = std::env::var(ENV_TRENDS_DAILY_LIMIT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DAILY_LIMIT);
            Arc::new(HttpTrends::new(base_url, daily_limit))
        }
        _ => Arc::new(DisabledTrends),
    }
}

/// Returns `None` always; used when no trends backend is configured.
pub struct DisabledTrends;

#[async_trait::async_trait]
impl TrendsProvider for DisabledTrends {
    async fn boost(&self, _topics: &TopicSet) -> Option<TrendsBoost> {
        None
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic mock for tests/local runs: breakout for anything containing
/// "viral", mild growth otherwise.
#[derive(Clone, Default)]
pub struct MockTrends;

#[async_trait::async_trait]
impl TrendsProvider for MockTrends {
    async fn boost(&self, topics: &TopicSet) -> Option<TrendsBoost> {
        let breakout = topics.topics().iter().any(|t| t.contains("viral"));
        Some(TrendsBoost {
            interest_score: if breakout { 85.0 } else { 40.0 },
            week_over_week_growth: if breakout { 150.0 } else { 12.0 },
            is_breakout: breakout,
        })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// HTTP provider for the search-interest service. Requires `TRENDS_API_KEY`.
pub struct HttpTrends {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    daily_limit: u32,
    quota: Mutex<DailyQuota>,
}

impl HttpTrends {
    pub fn new(base_url: String, daily_limit: u32) -> Self {
        let api_key = std::env::var(ENV_TRENDS_API_KEY).unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("recipe-demand-analyzer/0.1 (+github.com/lumlich/recipe-demand-analyzer)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            api_key,
            daily_limit,
            quota: Mutex::new(DailyQuota::default()),
        }
    }

    fn take_quota(&self) -> bool {
        let mut q = self.quota.lock().expect("poisoned quota");
        if q.is_expired() {
            q.reset_to_today();
        }
        if q.count >= self.daily_limit {
            return false;
        }
        q.count = q.count.saturating_add(1);
        true
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterestResp {
    interest_score: f64,
    week_over_week_growth: f64,
    #[serde(default)]
    is_breakout: bool,
}

#[async_trait::async_trait]
impl TrendsProvider for HttpTrends {
    async fn boost(&self, topics: &TopicSet) -> Option<TrendsBoost> {
        if self.api_key.is_empty() {
            return None;
        }
        // Quota is spent up front; a failed call still counts against it.
        if !self.take_quota() {
            counter!("trends_fallback_total").increment(1);
            debug!(target: "trends", "daily quota exhausted, degrading to no boost");
            return None;
        }

        let url = format!("{}/v1/interest", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .query(&[("q", topics.topics().join(","))])
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            counter!("trends_fallback_total").increment(1);
            return None;
        }
        let body: InterestResp = resp.json().await.ok()?;
        Some(TrendsBoost {
            interest_score: body.interest_score.clamp(0.0, 100.0),
            week_over_week_growth: body.week_over_week_growth,
            is_breakout: body.is_breakout,
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Day-scoped call counter. Day granularity is enough for a quota; avoids
/// pulling scheduling into this module.
#[derive(Debug, Clone)]
struct DailyQuota {
    day: u64,
    count: u32,
}

impl Default for DailyQuota {
    fn default() -> Self {
        Self {
            day: today(),
            count: 0,
        }
    }
}

impl DailyQuota {
    fn is_expired(&self) -> bool {
        self.day != today()
    }
    fn reset_to_today(&mut self) {
        self.day = today();
        self.count = 0;
    }
}

fn today() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    secs / 86_400
}
