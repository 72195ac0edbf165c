//! CLI command implementations for unifi-site-exporter.
//!
//! - `check`: configuration and snapshot validation
//! - `config`: configuration file generation
//! - `export`: one export cycle printed to stdout
//! - `generate-report`: synthetic snapshot generation
//! - `metrics`: metric catalogue listing

pub mod check;
pub mod config;
pub mod export;
pub mod generate;
pub mod metrics;

pub use check::command_check;
pub use config::command_config;
pub use export::command_export;
pub use generate::command_generate_report;
pub use metrics::command_metrics;
