//! CLI arguments and subcommands for unifi-site-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for the export subcommand
#[derive(Debug, Clone, ValueEnum)]
pub enum ExportFormat {
    /// Prometheus text exposition format
    Prometheus,
    /// JSON list of samples
    Json,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "unifi-site-exporter",
    about = "Prometheus exporter for UniFi site health metrics",
    long_about = "Prometheus exporter for UniFi site health metrics.\n\n\
                  Reads controller site health snapshots and exports per-subsystem \
                  (LAN, WAN, WLAN, WWW, VPN) metrics such as client counts, \
                  throughput, uplink latency and remote-user traffic.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Metric namespace (empty for plain "site_" prefix)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Path to controller site health snapshot (JSON)
    #[arg(short = 'r', long)]
    pub report_file: Option<PathBuf>,

    /// Re-read the snapshot after N seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// Parallel export threads (0 = auto)
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and the report snapshot
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Run one export cycle on the snapshot and print the result
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "prometheus")]
        format: ExportFormat,
    },

    /// Generate a synthetic controller snapshot JSON file
    GenerateReport {
        /// Output file path
        #[arg(short = 'o', long, default_value = "report.json")]
        output: PathBuf,

        /// Number of sites to generate
        #[arg(long, default_value_t = 3)]
        sites: usize,
    },

    /// List exported metrics with their groups and kinds
    Metrics {
        /// Only show metrics for this subsystem (lan, wan, wlan, www, vpn)
        #[arg(short = 's', long)]
        subsystem: Option<String>,
    },
}
