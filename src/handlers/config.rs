//! Configuration display endpoint handler.
//!
//! This module provides the `/config` endpoint handler that displays
//! the current exporter configuration.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::config::{Config, DEFAULT_BIND_ADDR, DEFAULT_CACHE_TTL, DEFAULT_PORT};
use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Renders the effective configuration as a plain-text listing.
pub fn render_config_text(cfg: &Config) -> String {
    let mut out = String::new();

    writeln!(out, "UNIFI SITE EXPORTER - CONFIGURATION").ok();
    writeln!(out, "===================================").ok();
    writeln!(out).ok();

    writeln!(out, "SERVER CONFIGURATION").ok();
    writeln!(out, "--------------------").ok();
    writeln!(
        out,
        "bind:                       {}",
        cfg.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    )
    .ok();
    writeln!(
        out,
        "port:                       {}",
        cfg.port.unwrap_or(DEFAULT_PORT)
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "TLS/SSL CONFIGURATION").ok();
    writeln!(out, "---------------------").ok();
    writeln!(
        out,
        "enable_tls:                 {}",
        cfg.enable_tls.unwrap_or(false)
    )
    .ok();
    writeln!(
        out,
        "tls_cert_path:              {}",
        cfg.tls_cert_path.as_deref().unwrap_or("none")
    )
    .ok();
    writeln!(
        out,
        "tls_key_path:               {}",
        cfg.tls_key_path.as_deref().unwrap_or("none")
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "EXPORT").ok();
    writeln!(out, "------").ok();
    writeln!(out, "namespace:                  {:?}", cfg.namespace()).ok();
    writeln!(
        out,
        "report_file:                {}",
        cfg.report_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    )
    .ok();
    writeln!(
        out,
        "cache_ttl:                  {} seconds",
        cfg.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL)
    )
    .ok();
    writeln!(
        out,
        "parallelism:                {}",
        cfg.parallelism
            .filter(|&n| n > 0)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "auto".to_string())
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "FEATURE FLAGS").ok();
    writeln!(out, "-------------").ok();
    writeln!(
        out,
        "enable_health:              {}",
        cfg.enable_health.unwrap_or(true)
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "LOGGING").ok();
    writeln!(out, "-------").ok();
    writeln!(
        out,
        "log_level:                  {}",
        cfg.log_level.as_deref().unwrap_or("info")
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    out
}

/// Handler for the /config endpoint.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /config request");

    state.stats.record_http_request();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        render_config_text(&state.config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_text_defaults() {
        let out = render_config_text(&Config::default());
        assert!(out.contains("port:                       9130"));
        assert!(out.contains("namespace:                  \"unifi\""));
        assert!(out.contains("report_file:                none"));
        assert!(out.contains("parallelism:                auto"));
    }
}
