//! HTTP endpoint handlers for the exporter.
//!
//! - `/`: landing page
//! - `/metrics`: Prometheus metrics endpoint
//! - `/health`: exporter health statistics
//! - `/config`: effective configuration

pub mod config;
pub mod health;
pub mod metrics;
pub mod root;

pub use config::config_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;
