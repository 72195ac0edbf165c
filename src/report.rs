//! Controller report model.
//!
//! A [`Report`] is one snapshot of the controller's site health data. It is
//! produced by whatever fetched the data and is only read by the exporter.
//! Numeric fields accept the controller's loose encoding (numbers, numeric
//! strings, booleans, null) and fall back to zero.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Error type for loading report snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report file not found: {0}")]
    NotFound(String),

    #[error("Failed to read report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse report JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Functional subsystem of a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subsystem {
    Lan,
    Wan,
    Wlan,
    Www,
    Vpn,
    /// A tag this exporter does not know. Carried through so it can be logged.
    Unknown(String),
}

impl Subsystem {
    /// Parses a controller subsystem token. Only the exact lower-case tags
    /// are known; anything else keeps its raw spelling.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "lan" => Subsystem::Lan,
            "wan" => Subsystem::Wan,
            "wlan" => Subsystem::Wlan,
            "www" => Subsystem::Www,
            "vpn" => Subsystem::Vpn,
            _ => Subsystem::Unknown(raw.to_string()),
        }
    }

    /// Returns the controller token, used as the `subsystem` label value.
    pub fn as_str(&self) -> &str {
        match self {
            Subsystem::Lan => "lan",
            Subsystem::Wan => "wan",
            Subsystem::Wlan => "wlan",
            Subsystem::Www => "www",
            Subsystem::Vpn => "vpn",
            Subsystem::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Subsystem::Unknown(_))
    }
}

impl Default for Subsystem {
    fn default() -> Self {
        Subsystem::Unknown(String::new())
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Subsystem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Subsystem::parse(&raw))
    }
}

impl Serialize for Subsystem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Loosely typed number as sent by the controller.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// Deserializes a controller number, mapping anything unusable to zero.
fn flex_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<FlexValue>::deserialize(deserializer)? {
        Some(FlexValue::Number(n)) => n,
        Some(FlexValue::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(FlexValue::Bool(b)) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        None => 0.0,
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}

/// Health status of one subsystem within a site.
///
/// Which fields carry meaning depends on `subsystem`; the others are present
/// (usually zero) and are never exported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Health {
    pub subsystem: Subsystem,
    pub status: String,

    #[serde(deserialize_with = "flex_number")]
    pub num_user: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_guest: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_iot: f64,
    #[serde(rename = "tx_bytes-r", deserialize_with = "flex_number")]
    pub tx_bytes_r: f64,
    #[serde(rename = "rx_bytes-r", deserialize_with = "flex_number")]
    pub rx_bytes_r: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_ap: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_adopted: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_disabled: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_disconnected: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_pending: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_gw: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_sw: f64,
    #[serde(deserialize_with = "flex_number")]
    pub num_sta: f64,

    // WWW uplink
    #[serde(deserialize_with = "flex_number")]
    pub latency: f64,
    #[serde(deserialize_with = "flex_number")]
    pub uptime: f64,
    #[serde(deserialize_with = "flex_number")]
    pub drops: f64,
    #[serde(deserialize_with = "flex_number")]
    pub xput_up: f64,
    #[serde(deserialize_with = "flex_number")]
    pub xput_down: f64,
    #[serde(deserialize_with = "flex_number")]
    pub speedtest_ping: f64,

    // VPN remote users
    #[serde(deserialize_with = "flex_number")]
    pub remote_user_num_active: f64,
    #[serde(deserialize_with = "flex_number")]
    pub remote_user_num_inactive: f64,
    #[serde(deserialize_with = "flex_number")]
    pub remote_user_rx_bytes: f64,
    #[serde(deserialize_with = "flex_number")]
    pub remote_user_tx_bytes: f64,
    #[serde(deserialize_with = "flex_number")]
    pub remote_user_rx_packets: f64,
    #[serde(deserialize_with = "flex_number")]
    pub remote_user_tx_packets: f64,
}

impl Health {
    /// Creates an all-zero record for the given subsystem and status.
    pub fn new(subsystem: Subsystem, status: &str) -> Self {
        Self {
            subsystem,
            status: status.to_string(),
            ..Self::default()
        }
    }
}

/// A monitored site and its subsystem health records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub name: String,
    pub desc: String,
    pub site_name: String,
    pub health: Vec<Health>,
}

impl Site {
    /// Constant label values for every sample of this site: `[name, desc, site_name]`.
    pub fn label_prefix(&self) -> [&str; 3] {
        [&self.name, &self.desc, &self.site_name]
    }
}

/// One collected snapshot of all sites.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub sites: Vec<Site>,
}

/// Accepts both `{"sites": [...]}` and a bare array of sites.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReportDocument {
    Wrapped(Report),
    Bare(Vec<Site>),
}

impl Report {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Total number of health records across all sites.
    pub fn record_count(&self) -> usize {
        self.sites.iter().map(|s| s.health.len()).sum()
    }

    /// Parses a controller snapshot document.
    pub fn from_json(content: &str) -> Result<Self, ReportError> {
        let report = match serde_json::from_str::<ReportDocument>(content)? {
            ReportDocument::Wrapped(report) => report,
            ReportDocument::Bare(sites) => Report::new(sites),
        };
        debug!(
            "Parsed report with {} sites and {} health records",
            report.sites.len(),
            report.record_count()
        );
        Ok(report)
    }

    /// Loads a controller snapshot from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ReportError> {
        debug!("Loading report from: {}", path.display());

        if !path.exists() {
            return Err(ReportError::NotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let report = Self::from_json(&content)?;

        info!(
            "Loaded report with {} sites from {}",
            report.sites.len(),
            path.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_parse_known_and_unknown() {
        assert_eq!(Subsystem::parse("lan"), Subsystem::Lan);
        assert_eq!(Subsystem::parse("wlan"), Subsystem::Wlan);
        assert_eq!(Subsystem::parse("www"), Subsystem::Www);
        assert_eq!(
            Subsystem::parse("WLAN"),
            Subsystem::Unknown("WLAN".to_string())
        );
        assert_eq!(Subsystem::parse("LAN").as_str(), "LAN");
        assert_eq!(
            Subsystem::parse("lte"),
            Subsystem::Unknown("lte".to_string())
        );
        assert!(!Subsystem::parse("lte").is_known());
        assert_eq!(Subsystem::parse("lte").as_str(), "lte");
    }

    #[test]
    fn test_health_flex_numbers() {
        let json = r#"{
            "subsystem": "wan",
            "status": "ok",
            "num_gw": "2",
            "num_sta": 17,
            "tx_bytes-r": 1024.5,
            "rx_bytes-r": null,
            "num_adopted": true,
            "num_pending": "n/a"
        }"#;
        let health: Health = serde_json::from_str(json).unwrap();
        assert_eq!(health.subsystem, Subsystem::Wan);
        assert_eq!(health.num_gw, 2.0);
        assert_eq!(health.num_sta, 17.0);
        assert_eq!(health.tx_bytes_r, 1024.5);
        assert_eq!(health.rx_bytes_r, 0.0);
        assert_eq!(health.num_adopted, 1.0);
        assert_eq!(health.num_pending, 0.0);
        assert_eq!(health.num_user, 0.0);
    }

    #[test]
    fn test_report_accepts_bare_site_array() {
        let json = r#"[{"name": "default", "desc": "HQ", "site_name": "HQ (default)",
                        "health": [{"subsystem": "lan", "status": "ok"}]}]"#;
        let report = Report::from_json(json).unwrap();
        assert_eq!(report.sites.len(), 1);
        assert_eq!(report.record_count(), 1);
        assert_eq!(report.sites[0].label_prefix(), ["default", "HQ", "HQ (default)"]);
    }

    #[test]
    fn test_report_accepts_wrapped_sites() {
        let json = r#"{"sites": [{"name": "a", "health": []}, {"name": "b"}]}"#;
        let report = Report::from_json(json).unwrap();
        assert_eq!(report.sites.len(), 2);
        assert_eq!(report.record_count(), 0);
        assert_eq!(report.sites[1].desc, "");
    }

    #[test]
    fn test_report_invalid_json() {
        assert!(matches!(
            Report::from_json("not json"),
            Err(ReportError::Parse(_))
        ));
    }
}
