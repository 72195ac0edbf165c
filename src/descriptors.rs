//! Site-level metric descriptors.
//!
//! Every site metric shares the same label names and differs only in name and
//! help text. The registry is built once at startup and shared by all export
//! cycles.

use prometheus::core::Desc;
use serde::{Serialize, Serializer};
use std::fmt;

/// Label names of every site-level metric, in exposition order.
pub const SITE_LABELS: [&str; 5] = ["subsystem", "status", "name", "desc", "site_name"];

/// Error type for descriptor construction.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Invalid descriptor '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: prometheus::Error,
    },
}

/// Key of one site-level metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SiteMetric {
    NumUser,
    NumGuest,
    NumIot,
    TxBytesRate,
    RxBytesRate,
    NumAp,
    NumAdopted,
    NumDisabled,
    NumDisconnected,
    NumPending,
    NumGateways,
    NumSwitches,
    NumStations,
    Latency,
    Uptime,
    Drops,
    XputUp,
    XputDown,
    SpeedtestPing,
    RemoteUserNumActive,
    RemoteUserNumInactive,
    RemoteUserRxBytes,
    RemoteUserTxBytes,
    RemoteUserRxPackets,
    RemoteUserTxPackets,
}

impl SiteMetric {
    pub const ALL: [SiteMetric; 25] = [
        SiteMetric::NumUser,
        SiteMetric::NumGuest,
        SiteMetric::NumIot,
        SiteMetric::TxBytesRate,
        SiteMetric::RxBytesRate,
        SiteMetric::NumAp,
        SiteMetric::NumAdopted,
        SiteMetric::NumDisabled,
        SiteMetric::NumDisconnected,
        SiteMetric::NumPending,
        SiteMetric::NumGateways,
        SiteMetric::NumSwitches,
        SiteMetric::NumStations,
        SiteMetric::Latency,
        SiteMetric::Uptime,
        SiteMetric::Drops,
        SiteMetric::XputUp,
        SiteMetric::XputDown,
        SiteMetric::SpeedtestPing,
        SiteMetric::RemoteUserNumActive,
        SiteMetric::RemoteUserNumInactive,
        SiteMetric::RemoteUserRxBytes,
        SiteMetric::RemoteUserTxBytes,
        SiteMetric::RemoteUserRxPackets,
        SiteMetric::RemoteUserTxPackets,
    ];

    /// Position of this metric in [`SiteMetric::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Metric name without namespace, e.g. `num_user`.
    pub fn name(self) -> &'static str {
        match self {
            SiteMetric::NumUser => "num_user",
            SiteMetric::NumGuest => "num_guest",
            SiteMetric::NumIot => "num_iot",
            SiteMetric::TxBytesRate => "transmit_rate_bytes",
            SiteMetric::RxBytesRate => "receive_rate_bytes",
            SiteMetric::NumAp => "num_ap",
            SiteMetric::NumAdopted => "num_adopted",
            SiteMetric::NumDisabled => "num_disabled",
            SiteMetric::NumDisconnected => "num_disconnected",
            SiteMetric::NumPending => "num_pending",
            SiteMetric::NumGateways => "num_gateways",
            SiteMetric::NumSwitches => "num_switches",
            SiteMetric::NumStations => "num_stations",
            SiteMetric::Latency => "latency_seconds",
            SiteMetric::Uptime => "uptime_seconds",
            // Misspelling is part of the published metric name.
            SiteMetric::Drops => "intenet_drops_total",
            SiteMetric::XputUp => "xput_up_rate",
            SiteMetric::XputDown => "xput_down_rate",
            SiteMetric::SpeedtestPing => "speedtest_ping",
            SiteMetric::RemoteUserNumActive => "num_remote_user_active",
            SiteMetric::RemoteUserNumInactive => "num_remote_user_inactive",
            SiteMetric::RemoteUserRxBytes => "remote_user_receive_bytes_total",
            SiteMetric::RemoteUserTxBytes => "remote_user_transmit_bytes_total",
            SiteMetric::RemoteUserRxPackets => "remote_user_receive_packets_total",
            SiteMetric::RemoteUserTxPackets => "remote_user_transmit_packets_total",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            SiteMetric::NumUser => "Number of Users",
            SiteMetric::NumGuest => "Number of Guests",
            SiteMetric::NumIot => "Number of IoT Devices",
            SiteMetric::TxBytesRate => "Bytes Transmit Rate",
            SiteMetric::RxBytesRate => "Bytes Receive Rate",
            SiteMetric::NumAp => "Access Point Count",
            SiteMetric::NumAdopted => "Adoption Count",
            SiteMetric::NumDisabled => "Disabled Count",
            SiteMetric::NumDisconnected => "Disconnected Count",
            SiteMetric::NumPending => "Pending Count",
            SiteMetric::NumGateways => "Gateway Count",
            SiteMetric::NumSwitches => "Switch Count",
            SiteMetric::NumStations => "Station Count",
            SiteMetric::Latency => "Latency",
            SiteMetric::Uptime => "Uptime",
            SiteMetric::Drops => "Internet (WAN) Disconnections",
            SiteMetric::XputUp => "Speedtest Upload",
            SiteMetric::XputDown => "Speedtest Download",
            SiteMetric::SpeedtestPing => "Speedtest Ping",
            SiteMetric::RemoteUserNumActive => "Remote Users Active",
            SiteMetric::RemoteUserNumInactive => "Remote Users Inactive",
            SiteMetric::RemoteUserRxBytes => "Remote Users Receive Bytes",
            SiteMetric::RemoteUserTxBytes => "Remote Users Transmit Bytes",
            SiteMetric::RemoteUserRxPackets => "Remote Users Receive Packets",
            SiteMetric::RemoteUserTxPackets => "Remote Users Transmit Packets",
        }
    }
}

impl fmt::Display for SiteMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SiteMetric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Returns the name prefix for site metrics: `{namespace}_site_`, or `site_`
/// when the namespace is empty.
pub fn site_prefix(namespace: &str) -> String {
    if namespace.is_empty() {
        "site_".to_string()
    } else {
        format!("{}_site_", namespace)
    }
}

/// Immutable set of site-level descriptors, one per metric in
/// [`SiteMetric::ALL`] order.
#[derive(Debug, Clone)]
pub struct SiteDescriptors {
    namespace: String,
    descs: Vec<Desc>,
}

impl SiteDescriptors {
    /// Builds one descriptor per [`SiteMetric`] under the given namespace.
    ///
    /// Fails only when the namespace produces names Prometheus rejects.
    pub fn new(namespace: &str) -> Result<Self, DescriptorError> {
        let prefix = site_prefix(namespace);
        let labels: Vec<String> = SITE_LABELS.iter().map(|l| l.to_string()).collect();

        let mut descs = Vec::with_capacity(SiteMetric::ALL.len());
        for metric in SiteMetric::ALL {
            let name = format!("{}{}", prefix, metric.name());
            let desc = Desc::new(
                name.clone(),
                metric.help().to_string(),
                labels.clone(),
                Default::default(),
            )
            .map_err(|source| DescriptorError::Invalid { name, source })?;
            descs.push(desc);
        }

        Ok(Self {
            namespace: namespace.to_string(),
            descs,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, metric: SiteMetric) -> &Desc {
        &self.descs[metric.index()]
    }

    /// Fully qualified name of a metric, e.g. `unifi_site_num_user`.
    pub fn fq_name(&self, metric: SiteMetric) -> &str {
        &self.get(metric).fq_name
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    /// Descriptors in [`SiteMetric::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SiteMetric, &Desc)> + '_ {
        SiteMetric::ALL.iter().copied().zip(self.descs.iter())
    }
}
