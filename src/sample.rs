//! Samples and output sinks.
//!
//! A [`Sample`] is one measurement produced during an export cycle. Samples
//! are handed to a [`SampleSink`] in batches; the sink must accept concurrent
//! writers since sites are exported in parallel.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::descriptors::SiteMetric;
use crate::selector::ValueKind;

/// One labeled measurement.
///
/// `labels` always follows [`crate::descriptors::SITE_LABELS`]:
/// `[subsystem, status, name, desc, site_name]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub metric: SiteMetric,
    pub kind: ValueKind,
    pub value: f64,
    pub labels: Vec<String>,
}

impl Sample {
    pub fn new(metric: SiteMetric, kind: ValueKind, value: f64, labels: Vec<String>) -> Self {
        Self {
            metric,
            kind,
            value,
            labels,
        }
    }

    pub fn label_refs(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }
}

/// Destination for exported samples.
///
/// Write failures are the sink's own concern; `send` never reports back.
pub trait SampleSink: Send + Sync {
    fn send(&self, samples: Vec<Sample>);
}

impl<S: SampleSink + ?Sized> SampleSink for &S {
    fn send(&self, samples: Vec<Sample>) {
        (**self).send(samples)
    }
}

impl<S: SampleSink + ?Sized> SampleSink for Arc<S> {
    fn send(&self, samples: Vec<Sample>) {
        (**self).send(samples)
    }
}

/// Writes a batch to the sink as-is.
pub fn emit<S: SampleSink + ?Sized>(sink: &S, samples: Vec<Sample>) {
    sink.send(samples);
}

/// Sink that keeps every sample in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    inner: Mutex<Vec<Sample>>,
    batches: Mutex<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all samples received so far.
    pub fn samples(&self) -> Vec<Sample> {
        match self.inner.lock() {
            Ok(s) => s.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drains all samples received so far.
    pub fn take(&self) -> Vec<Sample> {
        match self.inner.lock() {
            Ok(mut s) => std::mem::take(&mut *s),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `send` calls received.
    pub fn batches(&self) -> usize {
        self.batches.lock().map(|b| *b).unwrap_or(0)
    }
}

impl SampleSink for CollectingSink {
    fn send(&self, samples: Vec<Sample>) {
        if let Ok(mut s) = self.inner.lock() {
            s.extend(samples);
        }
        if let Ok(mut b) = self.batches.lock() {
            *b += 1;
        }
    }
}

/// Sink that forwards each batch over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Vec<Sample>>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Vec<Sample>>) -> Self {
        Self { tx }
    }
}

impl SampleSink for ChannelSink {
    fn send(&self, samples: Vec<Sample>) {
        if let Err(e) = self.tx.send(samples) {
            debug!("Sample channel closed, dropping {} samples", e.0.len());
        }
    }
}
