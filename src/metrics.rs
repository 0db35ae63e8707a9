// src/metrics.rs
//! Prometheus counters for intents, topic resolution and the knowledge-base cache.
//!
//! The `metrics` macros are no-ops until a recorder is installed, so library code can
//! always emit. The REPL installs a recorder only when `ADDMATHS_METRICS=1` and prints
//! the text exposition on the `stats` command; no HTTP listener is started.

use anyhow::{anyhow, Result};
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::intent::{IntentResult, MatchSource, ResolvedTopic};

pub const ENV_METRICS: &str = "ADDMATHS_METRICS";

/// One-time metrics registration (so series carry help text once a recorder exists).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("intent_classified_total", "Queries classified, by intent.");
        describe_counter!(
            "topic_resolve_total",
            "Topic resolutions, by outcome (direct, window, none)."
        );
        describe_counter!("kb_cache_hits_total", "Knowledge-base lookups served from cache.");
        describe_counter!(
            "kb_cache_misses_total",
            "Knowledge-base lookups forwarded to the provider."
        );
        describe_counter!(
            "kb_cache_evictions_total",
            "Least recently used entries dropped from a full cache table."
        );
    });
}

pub fn record_intent(intent: &IntentResult) {
    counter!("intent_classified_total", "intent" => intent.label()).increment(1);
}

pub fn record_resolution(topic: Option<&ResolvedTopic>) {
    let outcome = match topic.map(|t| t.source) {
        Some(MatchSource::Direct) => "direct",
        Some(MatchSource::Window) => "window",
        None => "none",
    };
    counter!("topic_resolve_total", "outcome" => outcome).increment(1);
}

pub fn record_cache(lookup: &'static str, hit: bool) {
    if hit {
        counter!("kb_cache_hits_total", "lookup" => lookup).increment(1);
    } else {
        counter!("kb_cache_misses_total", "lookup" => lookup).increment(1);
    }
}

pub fn record_cache_eviction(lookup: &'static str) {
    counter!("kb_cache_evictions_total", "lookup" => lookup).increment(1);
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if a recorder is already set.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow!("prometheus: install recorder: {e}"))?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Install the recorder only when `ADDMATHS_METRICS=1`.
    pub fn from_env() -> Result<Option<Self>> {
        let on = std::env::var(ENV_METRICS).ok().as_deref() == Some("1");
        if !on {
            return Ok(None);
        }
        Self::init().map(Some)
    }

    /// Prometheus text exposition of every series recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
