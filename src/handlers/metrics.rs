//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler. Every scrape runs one
//! export cycle over the current report snapshot (reloading it when stale) and
//! returns site metrics plus exporter self-metrics in Prometheus text format.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};
use std::time::Instant;
use tracing::{debug, error, instrument};
use unifi_site_exporter::render_samples;

use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 64 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");

    state.stats.record_http_request();
    state.stats.record_metrics_endpoint_call();

    let report = state.source.current(&state.stats).await;
    let (load_success, _) = state.source.status().await;
    state
        .report_load_success
        .set(if load_success { 1.0 } else { 0.0 });

    // The export cycle fans out on rayon, so keep it off the async workers.
    let collector = state.collector.clone();
    let (samples, summary) =
        tokio::task::spawn_blocking(move || collector.collect_samples(report.as_deref()))
        .await
        .map_err(|e| {
            error!("Export task failed: {}", e);
            MetricsError::EncodingFailed
        })?;

    state.stats.record_cycle(&summary);
    state.sites_total.set(summary.sites as f64);
    state.samples_total.set(summary.samples as f64);

    let serialize_start = Instant::now();
    let mut families = state.registry.gather();
    families.extend(render_samples(state.collector.descriptors(), samples));

    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    let encoder = TextEncoder::new();

    if encoder.encode(&families, &mut buffer).is_err() {
        error!("Failed to encode Prometheus metrics");
        return Err(MetricsError::EncodingFailed);
    }

    state
        .stats
        .record_serialization_duration_ms(serialize_start.elapsed().as_secs_f64() * 1000.0);

    let duration = start.elapsed().as_secs_f64();
    state.scrape_duration.set(duration);
    debug!(
        "Served /metrics: {} sites, {} samples in {:.3}ms",
        summary.sites,
        summary.samples,
        duration * 1000.0
    );

    String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)
}
