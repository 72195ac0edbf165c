//! Site export dispatcher.
//!
//! Fans out one rayon task per site and returns once every site has been
//! written to the sink. Sites share nothing but the sink, so samples arrive
//! in no particular order.

use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace};

use crate::descriptors::SiteDescriptors;
use crate::report::{Health, Report, Site};
use crate::sample::{emit, Sample, SampleSink};
use crate::selector::groups_for;

/// Outcome of one export cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportSummary {
    pub sites: usize,
    pub records: usize,
    pub samples: usize,
    pub duration: Duration,
}

/// Exports site health records as samples.
#[derive(Debug, Clone)]
pub struct SiteExporter {
    descriptors: Arc<SiteDescriptors>,
}

impl SiteExporter {
    pub fn new(descriptors: Arc<SiteDescriptors>) -> Self {
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &Arc<SiteDescriptors> {
        &self.descriptors
    }

    /// Runs one export cycle over every site of the report.
    ///
    /// An absent or empty report is a no-op. Returns after all sites finished.
    #[instrument(skip_all)]
    pub fn export_sites<S>(&self, report: Option<&Report>, sink: &S) -> ExportSummary
    where
        S: SampleSink + ?Sized,
    {
        let report = match report {
            Some(r) if !r.is_empty() => r,
            _ => {
                debug!("No sites in report, nothing to export");
                return ExportSummary::default();
            }
        };

        let start = Instant::now();
        let samples = AtomicUsize::new(0);

        report.sites.par_iter().for_each(|site| {
            let n = self.export_site(site, sink);
            samples.fetch_add(n, Ordering::Relaxed);
        });

        let summary = ExportSummary {
            sites: report.sites.len(),
            records: report.record_count(),
            samples: samples.load(Ordering::Relaxed),
            duration: start.elapsed(),
        };
        debug!(
            "Exported {} samples from {} sites ({} records) in {:.3}ms",
            summary.samples,
            summary.sites,
            summary.records,
            summary.duration.as_secs_f64() * 1000.0
        );
        summary
    }

    /// Exports every health record of one site, in record order.
    ///
    /// Returns the number of samples written.
    pub fn export_site<S>(&self, site: &Site, sink: &S) -> usize
    where
        S: SampleSink + ?Sized,
    {
        let prefix = site.label_prefix();
        let mut written = 0;

        for health in &site.health {
            let labels = record_labels(health, &prefix);
            for batch in health_batches(health, &labels) {
                written += batch.len();
                emit(sink, batch);
            }
        }

        trace!("Site {} exported {} samples", site.name, written);
        written
    }
}

/// Label values for one record: `[subsystem, status, name, desc, site_name]`.
fn record_labels(health: &Health, prefix: &[&str; 3]) -> Vec<String> {
    let mut labels = Vec::with_capacity(5);
    labels.push(health.subsystem.as_str().to_string());
    labels.push(health.status.clone());
    labels.extend(prefix.iter().map(|l| l.to_string()));
    labels
}

/// One sample batch per selected metric group.
fn health_batches(health: &Health, labels: &[String]) -> Vec<Vec<Sample>> {
    let groups = groups_for(&health.subsystem);
    if groups.is_empty() {
        debug!(
            "Ignoring health record with unknown subsystem '{}'",
            health.subsystem
        );
    }

    groups
        .into_iter()
        .map(|group| {
            group
                .members()
                .iter()
                .map(|&(metric, kind)| {
                    Sample::new(metric, kind, metric.value(health), labels.to_vec())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::SiteMetric;
    use crate::report::Subsystem;
    use crate::sample::CollectingSink;
    use crate::selector::ValueKind;

    fn exporter() -> SiteExporter {
        SiteExporter::new(Arc::new(SiteDescriptors::new("unifi").unwrap()))
    }

    fn site(health: Vec<Health>) -> Site {
        Site {
            name: "default".into(),
            desc: "Main Office".into(),
            site_name: "Main Office (default)".into(),
            health,
        }
    }

    #[test]
    fn test_absent_report_is_noop() {
        let sink = CollectingSink::new();
        let summary = exporter().export_sites(None, &sink);
        assert_eq!(summary, ExportSummary::default());
        assert_eq!(sink.batches(), 0);
    }

    #[test]
    fn test_empty_report_is_noop() {
        let sink = CollectingSink::new();
        exporter().export_sites(Some(&Report::default()), &sink);
        assert_eq!(sink.batches(), 0);
    }

    #[test]
    fn test_labels_prepend_subsystem_and_status() {
        let sink = CollectingSink::new();
        let written = exporter().export_site(&site(vec![Health::new(Subsystem::Wan, "warning")]), &sink);
        assert_eq!(written, 7);
        for sample in sink.samples() {
            assert_eq!(
                sample.labels,
                vec!["wan", "warning", "default", "Main Office", "Main Office (default)"]
            );
        }
    }

    #[test]
    fn test_one_batch_per_group() {
        let sink = CollectingSink::new();
        exporter().export_site(&site(vec![Health::new(Subsystem::Lan, "ok")]), &sink);
        assert_eq!(sink.batches(), 4);
        assert_eq!(sink.len(), 9);
    }

    #[test]
    fn test_vpn_emits_counters_without_throughput() {
        let mut vpn = Health::new(Subsystem::Vpn, "ok");
        vpn.remote_user_rx_bytes = 4096.0;
        vpn.tx_bytes_r = 99.0;

        let sink = CollectingSink::new();
        exporter().export_site(&site(vec![vpn]), &sink);
        let samples = sink.samples();

        assert_eq!(samples.len(), 6);
        assert!(samples.iter().all(|s| s.metric != SiteMetric::TxBytesRate));
        let rx = samples
            .iter()
            .find(|s| s.metric == SiteMetric::RemoteUserRxBytes)
            .unwrap();
        assert_eq!(rx.kind, ValueKind::Counter);
        assert_eq!(rx.value, 4096.0);
    }

    #[test]
    fn test_unknown_subsystem_writes_nothing() {
        let sink = CollectingSink::new();
        let written = exporter().export_site(
            &site(vec![Health::new(Subsystem::parse("cellular"), "ok")]),
            &sink,
        );
        assert_eq!(written, 0);
        assert_eq!(sink.batches(), 0);
    }

    #[test]
    fn test_summary_counts() {
        let report = Report::new(vec![
            site(vec![
                Health::new(Subsystem::Lan, "ok"),
                Health::new(Subsystem::Www, "ok"),
            ]),
            site(vec![Health::new(Subsystem::Vpn, "ok")]),
        ]);
        let sink = CollectingSink::new();
        let summary = exporter().export_sites(Some(&report), &sink);
        assert_eq!(summary.sites, 2);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.samples, 9 + 8 + 6);
        assert_eq!(sink.len(), summary.samples);
    }
}
