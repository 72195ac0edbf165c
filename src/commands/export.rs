//! Export command implementation.
//!
//! Runs one export cycle over the snapshot and prints the samples.

use prometheus::{Encoder, TextEncoder};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use unifi_site_exporter::{render_samples, ChannelSink, Report, SiteDescriptors, SiteExporter};

use crate::cli::ExportFormat;
use crate::config::Config;

/// Exports the configured snapshot once to stdout.
pub fn command_export(
    format: ExportFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config
        .report_file
        .as_ref()
        .ok_or("report_file is not set (use --report-file or the config file)")?;
    let report = Report::load_from_file(path)?;

    let descriptors = Arc::new(SiteDescriptors::new(config.namespace())?);
    let exporter = SiteExporter::new(Arc::clone(&descriptors));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let summary = exporter.export_sites(Some(&report), &ChannelSink::new(tx));

    let mut samples = Vec::with_capacity(summary.samples);
    while let Ok(batch) = rx.try_recv() {
        samples.extend(batch);
    }

    info!(
        "Exported {} samples from {} sites in {:.3}ms",
        samples.len(),
        summary.sites,
        summary.duration.as_secs_f64() * 1000.0
    );

    let mut stdout = std::io::stdout().lock();
    match format {
        ExportFormat::Prometheus => {
            let families = render_samples(&descriptors, samples);
            let mut buffer = Vec::new();
            TextEncoder::new().encode(&families, &mut buffer)?;
            stdout.write_all(&buffer)?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &samples)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
