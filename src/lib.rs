//! UniFi Site Exporter Library
//!
//! This library turns a controller's per-site health report into Prometheus
//! samples. Each site carries one health record per subsystem (LAN, WAN,
//! WLAN, WWW, VPN) and every subsystem exports its own subset of metrics.
//! It is framework-agnostic: the [`SiteCollector`] plugs into any
//! `prometheus::Registry`, and [`SiteExporter`] can write into any
//! [`SampleSink`].
//!
//! # Features
//!
//! - **Descriptor Registry**: one descriptor per site metric, built once
//! - **Selection Table**: subsystem to metric groups, gauge vs. counter
//! - **Parallel Export**: one rayon task per site, joined before returning
//! - **Prometheus Bridge**: scrape-time rendering into metric families
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use unifi_site_exporter::{
//!     CollectingSink, Health, Report, Site, SiteDescriptors, SiteExporter, Subsystem,
//! };
//!
//! let descriptors = Arc::new(SiteDescriptors::new("unifi").unwrap());
//! let exporter = SiteExporter::new(descriptors);
//!
//! let report = Report::new(vec![Site {
//!     name: "default".into(),
//!     desc: "Main Office".into(),
//!     site_name: "Main Office (default)".into(),
//!     health: vec![Health::new(Subsystem::Lan, "ok")],
//! }]);
//!
//! let sink = CollectingSink::new();
//! let summary = exporter.export_sites(Some(&report), &sink);
//! assert_eq!(summary.samples, 9);
//! ```

pub mod collector;
pub mod descriptors;
pub mod exporter;
pub mod report;
pub mod sample;
pub mod selector;
pub mod stats;

// Re-export main types for convenience
pub use collector::{render_samples, SiteCollector};
pub use descriptors::{DescriptorError, SiteDescriptors, SiteMetric, SITE_LABELS};
pub use exporter::{ExportSummary, SiteExporter};
pub use report::{Health, Report, ReportError, Site, Subsystem};
pub use sample::{emit, ChannelSink, CollectingSink, Sample, SampleSink};
pub use selector::{groups_for, sample_count, MetricGroup, ValueKind};
pub use stats::ExportStats;
