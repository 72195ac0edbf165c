//! Prometheus collector for site metrics.
//!
//! `SiteCollector` runs a full export cycle over a report and turns the
//! collected samples into metric families. Callers that own a report pass it
//! to [`SiteCollector::collect_samples`]; a collector registered with a
//! `Registry` exports whatever was last given to [`SiteCollector::set_report`].

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use ahash::AHashSet as HashSet;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, GaugeVec, Opts};
use tracing::{debug, warn};

use crate::descriptors::{SiteDescriptors, SiteMetric, SITE_LABELS};
use crate::exporter::{ExportSummary, SiteExporter};
use crate::report::Report;
use crate::sample::{CollectingSink, Sample};
use crate::selector::ValueKind;

/// Collector exposing the current report as site-level metrics.
#[derive(Clone)]
pub struct SiteCollector {
    exporter: SiteExporter,
    report: Arc<RwLock<Option<Arc<Report>>>>,
    last_summary: Arc<RwLock<ExportSummary>>,
}

impl SiteCollector {
    pub fn new(descriptors: Arc<SiteDescriptors>) -> Self {
        Self {
            exporter: SiteExporter::new(descriptors),
            report: Arc::new(RwLock::new(None)),
            last_summary: Arc::new(RwLock::new(ExportSummary::default())),
        }
    }

    pub fn descriptors(&self) -> &Arc<SiteDescriptors> {
        self.exporter.descriptors()
    }

    /// Replaces the report exported through the [`Collector`] impl.
    pub fn set_report(&self, report: Option<Arc<Report>>) {
        if let Ok(mut guard) = self.report.write() {
            *guard = report;
        }
    }

    pub fn report(&self) -> Option<Arc<Report>> {
        self.report.read().ok().and_then(|r| r.clone())
    }

    /// Summary of the most recent collection.
    pub fn last_summary(&self) -> ExportSummary {
        self.last_summary.read().map(|s| *s).unwrap_or_default()
    }

    /// Runs one export cycle over `report` and returns the samples.
    pub fn collect_samples(&self, report: Option<&Report>) -> (Vec<Sample>, ExportSummary) {
        let sink = CollectingSink::new();
        let summary = self.exporter.export_sites(report, &sink);
        if let Ok(mut last) = self.last_summary.write() {
            *last = summary;
        }
        (sink.take(), summary)
    }
}

impl Collector for SiteCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.exporter
            .descriptors()
            .iter()
            .map(|(_, desc)| desc)
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let report = self.report();
        let (samples, _) = self.collect_samples(report.as_deref());
        render_samples(self.exporter.descriptors(), samples)
    }
}

/// Converts samples into metric families, one family per metric.
///
/// Counters are written as absolute values. Negative counter values cannot be
/// represented and are exported as zero. When two samples of one metric carry
/// the same label values, the first is kept and the rest are dropped with a
/// warning.
pub fn render_samples(descriptors: &SiteDescriptors, samples: Vec<Sample>) -> Vec<MetricFamily> {
    let mut by_metric: BTreeMap<SiteMetric, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        by_metric.entry(sample.metric).or_default().push(sample);
    }

    let mut families = Vec::with_capacity(by_metric.len());
    for (metric, samples) in by_metric {
        let desc = descriptors.get(metric);
        let samples = dedup_series(&desc.fq_name, samples);
        let opts = Opts::new(desc.fq_name.clone(), desc.help.clone());
        let kind = samples.first().map(|s| s.kind).unwrap_or(ValueKind::Gauge);

        match kind {
            ValueKind::Gauge => match GaugeVec::new(opts, &SITE_LABELS) {
                Ok(vec) => {
                    for sample in &samples {
                        let labels = sample.label_refs();
                        vec.with_label_values(labels.as_slice()).set(sample.value);
                    }
                    families.extend(vec.collect());
                }
                Err(e) => warn!("Failed to build gauge {}: {}", desc.fq_name, e),
            },
            ValueKind::Counter => match CounterVec::new(opts, &SITE_LABELS) {
                Ok(vec) => {
                    for sample in &samples {
                        let labels = sample.label_refs();
                        let counter = vec.with_label_values(labels.as_slice());
                        counter.reset();
                        if sample.value > 0.0 {
                            counter.inc_by(sample.value);
                        } else if sample.value < 0.0 {
                            debug!(
                                "Negative value {} for counter {}, exporting 0",
                                sample.value, desc.fq_name
                            );
                        }
                    }
                    families.extend(vec.collect());
                }
                Err(e) => warn!("Failed to build counter {}: {}", desc.fq_name, e),
            },
        }
    }

    families
}

/// Keeps the first sample for each label tuple of one metric.
fn dedup_series(fq_name: &str, samples: Vec<Sample>) -> Vec<Sample> {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(samples.len());
    samples
        .into_iter()
        .filter(|sample| {
            if seen.insert(sample.labels.clone()) {
                true
            } else {
                warn!(
                    "Duplicate series {}{{{}}} with value {}, keeping the first",
                    fq_name,
                    sample.labels.join(","),
                    sample.value
                );
                false
            }
        })
        .collect()
}
