//! Prometheus metrics for the shows service.
//!
//! Recording is always safe: without an installed recorder the macros are
//! no-ops, which is what unit tests run with.

use std::fmt;
use std::sync::OnceLock;
use tracing::info;

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Distance lookups
    DistanceRequestsSuccess,
    DistanceRequestsError,
    DistanceDuration,

    // Backend store
    BackendRequestsSuccess,
    BackendRequestsError,

    // Show writes
    ShowsCreated,
    ShowsUpdated,
    ShowsDeleted,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::DistanceRequestsSuccess => "shows_distance_requests_success_total",
            MetricName::DistanceRequestsError => "shows_distance_requests_error_total",
            MetricName::DistanceDuration => "shows_distance_duration_seconds",

            MetricName::BackendRequestsSuccess => "shows_backend_requests_success_total",
            MetricName::BackendRequestsError => "shows_backend_requests_error_total",

            MetricName::ShowsCreated => "shows_created_total",
            MetricName::ShowsUpdated => "shows_updated_total",
            MetricName::ShowsDeleted => "shows_deleted_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder. Calling it twice is an error
/// from the exporter; callers log and carry on.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition, or `None` when no recorder is installed.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod distance {
    use super::MetricName;

    pub fn success() {
        ::metrics::counter!(MetricName::DistanceRequestsSuccess.as_str()).increment(1);
    }

    pub fn error(kind: &str) {
        ::metrics::counter!(MetricName::DistanceRequestsError.as_str(), "kind" => kind.to_string())
            .increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::DistanceDuration.as_str()).record(secs);
    }
}

pub mod backend {
    use super::MetricName;

    pub fn success(operation: &'static str) {
        ::metrics::counter!(MetricName::BackendRequestsSuccess.as_str(), "operation" => operation)
            .increment(1);
    }

    pub fn error(operation: &'static str, status: u16) {
        ::metrics::counter!(
            MetricName::BackendRequestsError.as_str(),
            "operation" => operation,
            "status" => status.to_string()
        )
        .increment(1);
    }
}

pub mod shows {
    use super::MetricName;

    pub fn created() {
        ::metrics::counter!(MetricName::ShowsCreated.as_str()).increment(1);
    }

    pub fn updated() {
        ::metrics::counter!(MetricName::ShowsUpdated.as_str()).increment(1);
    }

    pub fn deleted() {
        ::metrics::counter!(MetricName::ShowsDeleted.as_str()).increment(1);
    }
}
