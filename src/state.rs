//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use prometheus::{Gauge, Registry};
use std::sync::Arc;
use std::time::Instant;
use unifi_site_exporter::{ExportStats, SiteCollector};

use crate::config::Config;
use crate::source::ReportSource;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub collector: SiteCollector,
    pub scrape_duration: Gauge,
    pub sites_total: Gauge,
    pub samples_total: Gauge,
    pub report_load_success: Gauge,
    pub source: ReportSource,
    pub config: Arc<Config>,
    pub stats: Arc<ExportStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
