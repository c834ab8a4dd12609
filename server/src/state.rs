use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::{upstream_connect_timeout, upstream_http_timeout};

/// Latest validated copy of the two upstream datasets. The mirror serves the
/// original bytes unchanged; the counts exist for health/metrics only.
#[derive(Debug, Default)]
pub struct DatasetCache {
    pub education_json: Option<Arc<Bytes>>,
    pub counties_json: Option<Arc<Bytes>>,
    pub education_records: usize,
    pub county_geometries: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Bumped on every successful refresh; drives the mirror ETags.
    pub version: u64,
}

impl DatasetCache {
    pub fn ready(&self) -> bool {
        self.education_json.is_some() && self.counties_json.is_some()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<RwLock<DatasetCache>>,
    pub http_client: reqwest::Client,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    dataset_refreshes_total: AtomicU64,
    upstream_fetch_failures_total: AtomicU64,
    data_requests_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub dataset_refreshes_total: u64,
    pub upstream_fetch_failures_total: u64,
    pub data_requests_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            dataset_refreshes_total: self.dataset_refreshes_total.load(Ordering::Relaxed),
            upstream_fetch_failures_total: self
                .upstream_fetch_failures_total
                .load(Ordering::Relaxed),
            data_requests_total: self.data_requests_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_dataset_refresh(&self) {
        self.dataset_refreshes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_fetch_failure(&self) {
        self.upstream_fetch_failures_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_data_request(&self) {
        self.data_requests_total.fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("edumap/0.1")
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
            datasets: Arc::new(RwLock::new(DatasetCache::default())),
            http_client,
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}
