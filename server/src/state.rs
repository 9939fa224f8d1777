use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::warn;
use waypoint_shared::Coordinates;

use crate::config::{
    Budget, home_address, maps_api_key, upstream_connect_timeout, upstream_http_timeout,
};

/// Last resolved home-address coordinate, keyed by the address string it was
/// resolved from. Stale entries (address changed) are replaced on next use.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeCache {
    pub address: String,
    pub coordinates: Coordinates,
}

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    /// Google Maps API credential. None means every render degrades.
    pub api_key: Option<String>,
    pub home_address: Option<String>,
    pub home_cache: Arc<RwLock<Option<HomeCache>>>,
    pub budget: Budget,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    compositions_total: AtomicU64,
    geocode_requests_total: AtomicU64,
    geocode_fallbacks_total: AtomicU64,
    geocode_failures_total: AtomicU64,
    markers_truncated_total: AtomicU64,
    home_cache_hits_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub compositions_total: u64,
    pub geocode_requests_total: u64,
    pub geocode_fallbacks_total: u64,
    pub geocode_failures_total: u64,
    pub markers_truncated_total: u64,
    pub home_cache_hits_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            compositions_total: self.compositions_total.load(Ordering::Relaxed),
            geocode_requests_total: self.geocode_requests_total.load(Ordering::Relaxed),
            geocode_fallbacks_total: self.geocode_fallbacks_total.load(Ordering::Relaxed),
            geocode_failures_total: self.geocode_failures_total.load(Ordering::Relaxed),
            markers_truncated_total: self.markers_truncated_total.load(Ordering::Relaxed),
            home_cache_hits_total: self.home_cache_hits_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_composition(&self) {
        self.compositions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geocode_request(&self) {
        self.geocode_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geocode_fallback(&self) {
        self.geocode_fallbacks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_geocode_failure(&self) {
        self.geocode_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_markers_truncated(&self, count: u64) {
        self.markers_truncated_total
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_home_cache_hit(&self) {
        self.home_cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("waypoint/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });
        Self {
            http_client,
            api_key: maps_api_key(),
            home_address: home_address(),
            home_cache: Arc::new(RwLock::new(None)),
            budget: Budget::from_env(),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
