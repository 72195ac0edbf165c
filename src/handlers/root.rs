//! Root endpoint handler for the landing page.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.stats.record_http_request();

    let uptime_secs = state.start_time.elapsed().as_secs();
    let uptime_str = format!(
        "{}h {}m {}s",
        uptime_secs / 3600,
        (uptime_secs % 3600) / 60,
        uptime_secs % 60
    );

    let summary = state.collector.last_summary();
    let health_link = if state.config.enable_health.unwrap_or(true) {
        r#"<li><a href="/health">/health</a><div class="endpoint-desc">Exporter statistics and report snapshot state (text)</div></li>"#
    } else {
        ""
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>UniFi Site Exporter</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 900px; margin: 0 auto; background: white; padding: 40px; border-radius: 8px; }}
        h1 {{ color: #333; border-bottom: 3px solid #007bff; padding-bottom: 15px; }}
        .info {{ background: #e9ecef; padding: 15px; border-radius: 4px; }}
        .endpoint-list {{ list-style: none; padding: 0; }}
        .endpoint-list li {{ margin: 15px 0; padding: 15px; background: #f8f9fa; border-left: 4px solid #007bff; }}
        .endpoint-desc {{ color: #666; margin-top: 5px; }}
        .footer {{ margin-top: 40px; color: #666; font-size: 0.9em; text-align: center; }}
    </style>
</head>
<body>
<div class="container">
    <h1>UniFi Site Exporter</h1>
    <div class="info">
        <p>Uptime: {uptime}</p>
        <p>Namespace: <code>{namespace}</code></p>
        <p>Last export: {sites} sites, {records} health records, {samples} samples</p>
    </div>

    <h2>Available Endpoints</h2>
    <ul class="endpoint-list">
        <li><a href="/metrics">/metrics</a><div class="endpoint-desc">Prometheus-compatible metrics endpoint</div></li>
        {health_link}
        <li><a href="/config">/config</a><div class="endpoint-desc">Active runtime configuration (read-only)</div></li>
    </ul>

    <div class="footer"><p>{footer}</p></div>
</div>
</body>
</html>"#,
        uptime = uptime_str,
        namespace = state.config.namespace(),
        sites = summary.sites,
        records = summary.records,
        samples = summary.samples,
        health_link = health_link,
        footer = FOOTER_TEXT
    );

    Html(html)
}
