//! Prometheus recorder for the Store counters.
//!
//! Without an installed recorder the `metrics` calls in the runtime are
//! no-ops. With `--metrics-addr` the counters are served for scraping at
//! `http://<addr>/metrics`; otherwise they are kept in process and logged
//! when the program exits.

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from installing the recorder
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Exporter could not be built or registered as the global recorder
    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Where the counters end up
pub enum Metrics {
    /// Served over HTTP by the exporter
    Served(SocketAddr),
    /// Kept in process; render with [`PrometheusHandle::render`]
    Local(PrometheusHandle),
}

/// Install the global Prometheus recorder
///
/// Must run inside a Tokio runtime when `listen` is set, since the exporter
/// spawns its HTTP listener there.
///
/// # Errors
///
/// Returns [`TelemetryError::Install`] if a recorder is already installed or
/// the listener cannot be set up.
pub fn install(listen: Option<SocketAddr>) -> Result<Metrics, TelemetryError> {
    let builder = PrometheusBuilder::new();
    let metrics = match listen {
        Some(addr) => {
            builder
                .with_http_listener(addr)
                .install()
                .map_err(|e| TelemetryError::Install(e.to_string()))?;
            tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
            Metrics::Served(addr)
        },
        None => Metrics::Local(
            builder
                .install_recorder()
                .map_err(|e| TelemetryError::Install(e.to_string()))?,
        ),
    };
    describe_store_metrics();
    Ok(metrics)
}

/// Register help text for the counters the Store records
pub fn describe_store_metrics() {
    describe_counter!(
        "store.commands.total",
        "Actions reduced by the store, commands and outcomes alike"
    );
    describe_counter!(
        "store.effects.executed",
        "Effects returned by the reducer, labelled by type"
    );
}
