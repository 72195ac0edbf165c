//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! exporter statistics and the state of the report snapshot.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Footer text for human-readable HTTP endpoints.
pub const FOOTER_TEXT: &str = concat!("unifi-site-exporter ", env!("CARGO_PKG_VERSION"));

/// Formats an uptime in seconds as minutes, hours or days.
pub fn format_uptime(uptime_seconds: u64) -> String {
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    }
}

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    state.stats.record_http_request();

    let (load_success, last_error) = state.source.status().await;

    // Unhealthy until a snapshot has been loaded successfully.
    let status = if load_success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let message = match &last_error {
        None if load_success => "OK".to_string(),
        None => "No report loaded yet".to_string(),
        Some(e) => format!("Report load failed: {}", e),
    };

    let uptime_str = format_uptime(state.stats.get_uptime_seconds());
    let table = state.stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nReport: {}\nUptime: {uptime_str}\n\n{table}\n{FOOTER_TEXT}",
            state.source.path().display()
        ),
    )
}
