//! Subsystem selection table.
//!
//! Decides which metric groups a health record exports, based only on its
//! subsystem tag. Rows are independent: a record collects every group whose
//! condition matches, in table order.

use serde::Serialize;
use std::fmt;

use crate::descriptors::SiteMetric;
use crate::report::{Health, Subsystem};

/// Value semantics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Gauge,
    Counter,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Gauge => f.write_str("gauge"),
            ValueKind::Counter => f.write_str("counter"),
        }
    }
}

/// A set of metrics that is exported together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    /// Transmit and receive rate, every subsystem except VPN.
    Throughput,
    /// Remote-user counts and traffic counters, VPN only.
    RemoteAccess,
    /// Internet uplink quality, WWW only.
    UplinkQuality,
    /// Device adoption lifecycle, LAN/WLAN/WAN.
    Adoption,
    /// Client occupancy, LAN/WLAN.
    Occupancy,
    /// Access point counts, WLAN only.
    AccessPoints,
    /// Gateway and station counts, WAN only.
    Gateways,
    /// Switch count, LAN only.
    Infrastructure,
}

const THROUGHPUT: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::TxBytesRate, ValueKind::Gauge),
    (SiteMetric::RxBytesRate, ValueKind::Gauge),
];

const REMOTE_ACCESS: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::RemoteUserNumActive, ValueKind::Gauge),
    (SiteMetric::RemoteUserNumInactive, ValueKind::Gauge),
    (SiteMetric::RemoteUserRxBytes, ValueKind::Counter),
    (SiteMetric::RemoteUserTxBytes, ValueKind::Counter),
    (SiteMetric::RemoteUserRxPackets, ValueKind::Counter),
    (SiteMetric::RemoteUserTxPackets, ValueKind::Counter),
];

const UPLINK_QUALITY: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::Uptime, ValueKind::Gauge),
    (SiteMetric::Latency, ValueKind::Gauge),
    (SiteMetric::XputUp, ValueKind::Gauge),
    (SiteMetric::XputDown, ValueKind::Gauge),
    (SiteMetric::SpeedtestPing, ValueKind::Gauge),
    (SiteMetric::Drops, ValueKind::Counter),
];

const ADOPTION: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::NumAdopted, ValueKind::Gauge),
    (SiteMetric::NumDisconnected, ValueKind::Gauge),
    (SiteMetric::NumPending, ValueKind::Gauge),
];

const OCCUPANCY: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::NumUser, ValueKind::Gauge),
    (SiteMetric::NumGuest, ValueKind::Gauge),
    (SiteMetric::NumIot, ValueKind::Gauge),
];

const ACCESS_POINTS: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::NumAp, ValueKind::Gauge),
    (SiteMetric::NumDisabled, ValueKind::Gauge),
];

const GATEWAYS: &[(SiteMetric, ValueKind)] = &[
    (SiteMetric::NumGateways, ValueKind::Gauge),
    (SiteMetric::NumStations, ValueKind::Gauge),
];

const INFRASTRUCTURE: &[(SiteMetric, ValueKind)] = &[(SiteMetric::NumSwitches, ValueKind::Gauge)];

impl MetricGroup {
    pub const ALL: [MetricGroup; 8] = [
        MetricGroup::Throughput,
        MetricGroup::RemoteAccess,
        MetricGroup::UplinkQuality,
        MetricGroup::Adoption,
        MetricGroup::Occupancy,
        MetricGroup::AccessPoints,
        MetricGroup::Gateways,
        MetricGroup::Infrastructure,
    ];

    /// Metrics of this group with their value kind, in emission order.
    pub fn members(self) -> &'static [(SiteMetric, ValueKind)] {
        match self {
            MetricGroup::Throughput => THROUGHPUT,
            MetricGroup::RemoteAccess => REMOTE_ACCESS,
            MetricGroup::UplinkQuality => UPLINK_QUALITY,
            MetricGroup::Adoption => ADOPTION,
            MetricGroup::Occupancy => OCCUPANCY,
            MetricGroup::AccessPoints => ACCESS_POINTS,
            MetricGroup::Gateways => GATEWAYS,
            MetricGroup::Infrastructure => INFRASTRUCTURE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricGroup::Throughput => "throughput",
            MetricGroup::RemoteAccess => "remote_access",
            MetricGroup::UplinkQuality => "uplink_quality",
            MetricGroup::Adoption => "adoption",
            MetricGroup::Occupancy => "occupancy",
            MetricGroup::AccessPoints => "access_points",
            MetricGroup::Gateways => "gateways",
            MetricGroup::Infrastructure => "infrastructure",
        }
    }

    /// Whether this group applies to a subsystem. Unknown subsystems match nothing.
    pub fn applies_to(self, subsystem: &Subsystem) -> bool {
        use Subsystem::*;
        match self {
            MetricGroup::Throughput => matches!(subsystem, Lan | Wan | Wlan | Www),
            MetricGroup::RemoteAccess => matches!(subsystem, Vpn),
            MetricGroup::UplinkQuality => matches!(subsystem, Www),
            MetricGroup::Adoption => matches!(subsystem, Lan | Wlan | Wan),
            MetricGroup::Occupancy => matches!(subsystem, Lan | Wlan),
            MetricGroup::AccessPoints => matches!(subsystem, Wlan),
            MetricGroup::Gateways => matches!(subsystem, Wan),
            MetricGroup::Infrastructure => matches!(subsystem, Lan),
        }
    }
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the groups a record with this subsystem exports, in table order.
pub fn groups_for(subsystem: &Subsystem) -> Vec<MetricGroup> {
    MetricGroup::ALL
        .iter()
        .copied()
        .filter(|g| g.applies_to(subsystem))
        .collect()
}

/// Number of samples a record with this subsystem produces.
pub fn sample_count(subsystem: &Subsystem) -> usize {
    groups_for(subsystem)
        .iter()
        .map(|g| g.members().len())
        .sum()
}

impl SiteMetric {
    /// Reads this metric's value from a health record.
    ///
    /// `Latency` is converted from milliseconds to seconds. `Uptime` is filled
    /// from the raw latency field, not from `uptime`; dashboards built on the
    /// published series depend on that mapping.
    pub fn value(self, h: &Health) -> f64 {
        match self {
            SiteMetric::NumUser => h.num_user,
            SiteMetric::NumGuest => h.num_guest,
            SiteMetric::NumIot => h.num_iot,
            SiteMetric::TxBytesRate => h.tx_bytes_r,
            SiteMetric::RxBytesRate => h.rx_bytes_r,
            SiteMetric::NumAp => h.num_ap,
            SiteMetric::NumAdopted => h.num_adopted,
            SiteMetric::NumDisabled => h.num_disabled,
            SiteMetric::NumDisconnected => h.num_disconnected,
            SiteMetric::NumPending => h.num_pending,
            SiteMetric::NumGateways => h.num_gw,
            SiteMetric::NumSwitches => h.num_sw,
            SiteMetric::NumStations => h.num_sta,
            SiteMetric::Latency => h.latency / 1000.0,
            SiteMetric::Uptime => h.latency,
            SiteMetric::Drops => h.drops,
            SiteMetric::XputUp => h.xput_up,
            SiteMetric::XputDown => h.xput_down,
            SiteMetric::SpeedtestPing => h.speedtest_ping,
            SiteMetric::RemoteUserNumActive => h.remote_user_num_active,
            SiteMetric::RemoteUserNumInactive => h.remote_user_num_inactive,
            SiteMetric::RemoteUserRxBytes => h.remote_user_rx_bytes,
            SiteMetric::RemoteUserTxBytes => h.remote_user_tx_bytes,
            SiteMetric::RemoteUserRxPackets => h.remote_user_rx_packets,
            SiteMetric::RemoteUserTxPackets => h.remote_user_tx_packets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_per_subsystem() {
        use MetricGroup::*;
        assert_eq!(
            groups_for(&Subsystem::Lan),
            vec![Throughput, Adoption, Occupancy, Infrastructure]
        );
        assert_eq!(
            groups_for(&Subsystem::Wlan),
            vec![Throughput, Adoption, Occupancy, AccessPoints]
        );
        assert_eq!(
            groups_for(&Subsystem::Wan),
            vec![Throughput, Adoption, Gateways]
        );
        assert_eq!(groups_for(&Subsystem::Www), vec![Throughput, UplinkQuality]);
        assert_eq!(groups_for(&Subsystem::Vpn), vec![RemoteAccess]);
    }

    #[test]
    fn test_unknown_subsystem_selects_nothing() {
        let unknown = Subsystem::Unknown("lte".to_string());
        assert!(groups_for(&unknown).is_empty());
        assert_eq!(sample_count(&unknown), 0);
    }

    #[test]
    fn test_sample_counts() {
        assert_eq!(sample_count(&Subsystem::Lan), 9);
        assert_eq!(sample_count(&Subsystem::Wlan), 10);
        assert_eq!(sample_count(&Subsystem::Wan), 7);
        assert_eq!(sample_count(&Subsystem::Www), 8);
        assert_eq!(sample_count(&Subsystem::Vpn), 6);
    }

    #[test]
    fn test_every_metric_belongs_to_exactly_one_group() {
        for metric in SiteMetric::ALL {
            let owners = MetricGroup::ALL
                .iter()
                .filter(|g| g.members().iter().any(|(m, _)| *m == metric))
                .count();
            assert_eq!(owners, 1, "{} should belong to one group", metric);
        }
    }

    #[test]
    fn test_counter_kinds() {
        let counters: Vec<SiteMetric> = MetricGroup::ALL
            .iter()
            .flat_map(|g| g.members().iter())
            .filter(|(_, kind)| *kind == ValueKind::Counter)
            .map(|(m, _)| *m)
            .collect();
        assert_eq!(
            counters,
            vec![
                SiteMetric::RemoteUserRxBytes,
                SiteMetric::RemoteUserTxBytes,
                SiteMetric::RemoteUserRxPackets,
                SiteMetric::RemoteUserTxPackets,
                SiteMetric::Drops,
            ]
        );
    }

    #[test]
    fn test_latency_and_uptime_values() {
        let mut h = Health::new(Subsystem::Www, "ok");
        h.latency = 25.0;
        h.uptime = 86_400.0;
        assert_eq!(SiteMetric::Latency.value(&h), 0.025);
        assert_eq!(SiteMetric::Uptime.value(&h), 25.0);
    }

    #[test]
    fn test_every_metric_reads_its_own_field() {
        let mut h = Health::new(Subsystem::Www, "ok");
        h.num_user = 1.0;
        h.num_guest = 2.0;
        h.num_iot = 3.0;
        h.tx_bytes_r = 4.0;
        h.rx_bytes_r = 5.0;
        h.num_ap = 6.0;
        h.num_adopted = 7.0;
        h.num_disabled = 8.0;
        h.num_disconnected = 9.0;
        h.num_pending = 10.0;
        h.num_gw = 11.0;
        h.num_sw = 12.0;
        h.num_sta = 13.0;
        h.latency = 14_000.0;
        h.uptime = 15.0;
        h.drops = 16.0;
        h.xput_up = 17.0;
        h.xput_down = 18.0;
        h.speedtest_ping = 19.0;
        h.remote_user_num_active = 20.0;
        h.remote_user_num_inactive = 21.0;
        h.remote_user_rx_bytes = 22.0;
        h.remote_user_tx_bytes = 23.0;
        h.remote_user_rx_packets = 24.0;
        h.remote_user_tx_packets = 25.0;

        let expected = [
            (SiteMetric::NumUser, 1.0),
            (SiteMetric::NumGuest, 2.0),
            (SiteMetric::NumIot, 3.0),
            (SiteMetric::TxBytesRate, 4.0),
            (SiteMetric::RxBytesRate, 5.0),
            (SiteMetric::NumAp, 6.0),
            (SiteMetric::NumAdopted, 7.0),
            (SiteMetric::NumDisabled, 8.0),
            (SiteMetric::NumDisconnected, 9.0),
            (SiteMetric::NumPending, 10.0),
            (SiteMetric::NumGateways, 11.0),
            (SiteMetric::NumSwitches, 12.0),
            (SiteMetric::NumStations, 13.0),
            (SiteMetric::Latency, 14.0),
            (SiteMetric::Uptime, 14_000.0),
            (SiteMetric::Drops, 16.0),
            (SiteMetric::XputUp, 17.0),
            (SiteMetric::XputDown, 18.0),
            (SiteMetric::SpeedtestPing, 19.0),
            (SiteMetric::RemoteUserNumActive, 20.0),
            (SiteMetric::RemoteUserNumInactive, 21.0),
            (SiteMetric::RemoteUserRxBytes, 22.0),
            (SiteMetric::RemoteUserTxBytes, 23.0),
            (SiteMetric::RemoteUserRxPackets, 24.0),
            (SiteMetric::RemoteUserTxPackets, 25.0),
        ];
        assert_eq!(expected.len(), SiteMetric::ALL.len());
        for (metric, value) in expected {
            assert_eq!(metric.value(&h), value, "{}", metric);
        }
    }
}
