//! unifi-site-exporter - version 0.1.0
//!
//! Prometheus exporter for UniFi site health with tracing logging.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod source;
mod state;

use axum::{routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use prometheus::{Gauge, Registry};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use unifi_site_exporter::{ExportStats, SiteCollector, SiteDescriptors};

use cli::{Args, Commands, LogLevel};
use commands::{
    command_check, command_config, command_export, command_generate_report, command_metrics,
};
use config::{
    resolve_config, show_config, validate_effective_config, validate_server_config, Config,
    DEFAULT_BIND_ADDR, DEFAULT_CACHE_TTL, DEFAULT_PORT,
};
use handlers::{config_handler, health_handler, metrics_handler, root_handler};
use source::ReportSource;
use state::AppState;

/// Picks the log level: an explicit `--log-level` wins, then the config file.
fn resolve_log_level(config: &Config, args: &Args) -> LevelFilter {
    let from_args = match args.log_level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    if !matches!(args.log_level, LogLevel::Info) {
        return from_args;
    }

    match config.log_level.as_deref() {
        Some("off") => LevelFilter::OFF,
        Some("error") => LevelFilter::ERROR,
        Some("warn") => LevelFilter::WARN,
        Some("debug") => LevelFilter::DEBUG,
        Some("trace") => LevelFilter::TRACE,
        _ => from_args,
    }
}

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config, args: &Args) {
    let log_level = resolve_log_level(config, args);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {}", log_level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Name of an exporter self-metric under the given namespace.
fn self_metric_name(namespace: &str, suffix: &str) -> String {
    if namespace.is_empty() {
        format!("exporter_{}", suffix)
    } else {
        format!("{}_exporter_{}", namespace, suffix)
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Config {
                output,
                format,
                commented,
            } => command_config(output.clone(), format.clone(), *commented),

            Commands::GenerateReport { output, sites } => {
                command_generate_report(output.clone(), *sites)
            }

            Commands::Check => command_check(&resolve_config(&args)?),

            Commands::Export { format } => {
                let config = load_validated_config(&args)?;
                setup_logging(&config, &args);
                command_export(format.clone(), &config)
            }

            Commands::Metrics { subsystem } => {
                command_metrics(subsystem.clone(), &load_validated_config(&args)?)
            }
        };
    }

    // Load configuration for main server mode
    let config = resolve_config(&args)?;

    if let Err(e) = validate_server_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config, &args);

    info!("Starting unifi-site-exporter");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    // Configure parallel export
    if let Some(threads) = config.parallelism {
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .unwrap_or_else(|e| error!("Failed to set rayon thread pool: {}", e));
            debug!("Rayon thread pool configured with {} threads", threads);
        }
    }

    let namespace = config.namespace().to_string();
    let descriptors = Arc::new(SiteDescriptors::new(&namespace)?);
    info!(
        "Built {} site metric descriptors (namespace {:?})",
        descriptors.len(),
        namespace
    );

    // Site metrics are rendered per scrape; the registry holds the self-metrics.
    let registry = Registry::new();

    let scrape_duration = Gauge::new(
        self_metric_name(&namespace, "scrape_duration_seconds"),
        "Time spent serving the last /metrics request",
    )?;
    let sites_total = Gauge::new(
        self_metric_name(&namespace, "sites_total"),
        "Number of sites in the last export cycle",
    )?;
    let samples_total = Gauge::new(
        self_metric_name(&namespace, "samples_total"),
        "Number of site samples in the last export cycle",
    )?;
    let report_load_success = Gauge::new(
        self_metric_name(&namespace, "report_load_success"),
        "Whether the last report snapshot load was successful (1) or failed (0)",
    )?;

    registry.register(Box::new(scrape_duration.clone()))?;
    registry.register(Box::new(sites_total.clone()))?;
    registry.register(Box::new(samples_total.clone()))?;
    registry.register(Box::new(report_load_success.clone()))?;

    debug!("Self-metrics registered successfully");

    let stats = Arc::new(ExportStats::new());

    let report_file: PathBuf = config
        .report_file
        .clone()
        .ok_or("report_file is not set")?;
    let source = ReportSource::new(report_file, config.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL));

    let state = Arc::new(AppState {
        registry,
        collector: SiteCollector::new(descriptors),
        scrape_duration,
        sites_total,
        samples_total,
        report_load_success,
        source,
        config: Arc::new(config.clone()),
        stats,
        start_time: Instant::now(),
    });

    // Initial snapshot load so a bad path shows up in the log right away
    info!("Loading initial report snapshot");
    state.source.reload(&state.stats).await;
    match state.source.status().await {
        (true, _) => info!("Initial report load completed successfully"),
        (false, err) => error!(
            "Initial report load failed: {}",
            err.unwrap_or_else(|| "unknown error".to_string())
        ),
    }

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app
        .route("/config", get(config_handler))
        .with_state(state.clone());

    if config.enable_tls.unwrap_or(false) {
        // Both paths were checked by validate_server_config().
        let (Some(cert_path), Some(key_path)) =
            (config.tls_cert_path.as_ref(), config.tls_key_path.as_ref())
        else {
            return Err("TLS is enabled but certificate or key path is missing".into());
        };

        info!("Loading TLS certificate from: {}", cert_path);
        info!("Loading TLS private key from: {}", key_path);

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| {
                error!("Failed to load TLS configuration: {}", e);
                e
            })?;

        info!(
            "unifi-site-exporter listening on https://{}:{}",
            bind_ip_str, port
        );

        let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    } else {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "unifi-site-exporter listening on http://{}:{}",
            bind_ip_str, port
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("Server error: {}", e);
                e
            })?;
    }

    info!("unifi-site-exporter stopped gracefully");
    Ok(())
}
