//! Generate-report command implementation.
//!
//! Writes a synthetic controller snapshot for testing the exporter
//! without a live controller.

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use unifi_site_exporter::{Health, Report, Site, Subsystem};

// Ranges for generated values
const MAX_RATE_BYTES: f64 = 125_000_000.0; // 1 Gbit/s
const MAX_CLIENTS: u32 = 250;
const MAX_LATENCY_MS: f64 = 80.0;
const MAX_REMOTE_BYTES: f64 = 10.0 * 1024.0 * 1024.0 * 1024.0;

const SUBSYSTEMS: [Subsystem; 5] = [
    Subsystem::Lan,
    Subsystem::Wan,
    Subsystem::Wlan,
    Subsystem::Www,
    Subsystem::Vpn,
];

/// Snapshot document as written to disk.
#[derive(Debug, Serialize)]
struct GeneratedReport<'a> {
    generated_at: String,
    sites: &'a [Site],
}

/// Generates a snapshot with one record per subsystem for every site.
pub fn command_generate_report(
    output: PathBuf,
    sites: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(
        "Generating report: sites={}, output={}",
        sites,
        output.display()
    );

    let mut rng = rand::thread_rng();
    let report = Report::new(
        (0..sites)
            .map(|i| generate_site(&mut rng, i))
            .collect::<Vec<_>>(),
    );

    let document = GeneratedReport {
        generated_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        sites: &report.sites,
    };
    fs::write(&output, serde_json::to_string_pretty(&document)?)?;

    println!(
        "✅ Generated report: {} sites, {} health records in {}",
        report.sites.len(),
        report.record_count(),
        output.display()
    );

    Ok(())
}

fn generate_site(rng: &mut impl Rng, index: usize) -> Site {
    let name = if index == 0 {
        "default".to_string()
    } else {
        format!("site{:02}", index)
    };
    let desc = format!("Site {}", index + 1);

    Site {
        site_name: format!("{} ({})", desc, name),
        name,
        desc,
        health: SUBSYSTEMS
            .iter()
            .map(|s| generate_health(rng, s.clone()))
            .collect(),
    }
}

/// Fills the fields a controller reports for the given subsystem.
fn generate_health(rng: &mut impl Rng, subsystem: Subsystem) -> Health {
    let status = if rng.gen_bool(0.9) { "ok" } else { "warning" };
    let mut h = Health::new(subsystem.clone(), status);

    if subsystem != Subsystem::Vpn {
        h.tx_bytes_r = rng.gen_range(0.0..MAX_RATE_BYTES).round();
        h.rx_bytes_r = rng.gen_range(0.0..MAX_RATE_BYTES).round();
    }

    match subsystem {
        Subsystem::Lan | Subsystem::Wlan => {
            h.num_user = rng.gen_range(0..MAX_CLIENTS) as f64;
            h.num_guest = rng.gen_range(0..MAX_CLIENTS / 10) as f64;
            h.num_iot = rng.gen_range(0..MAX_CLIENTS / 5) as f64;
            h.num_adopted = rng.gen_range(1..20) as f64;
            h.num_pending = rng.gen_range(0..2) as f64;
            h.num_disconnected = rng.gen_range(0..3) as f64;
            if subsystem == Subsystem::Lan {
                h.num_sw = h.num_adopted;
            } else {
                h.num_ap = h.num_adopted;
                h.num_disabled = rng.gen_range(0..2) as f64;
            }
        }
        Subsystem::Wan => {
            h.num_adopted = 1.0;
            h.num_gw = 1.0;
            h.num_sta = rng.gen_range(0..MAX_CLIENTS) as f64;
        }
        Subsystem::Www => {
            h.latency = rng.gen_range(1.0..MAX_LATENCY_MS).round();
            h.uptime = rng.gen_range(3600.0..30.0 * 86400.0_f64).round();
            h.drops = rng.gen_range(0..50) as f64;
            h.xput_up = rng.gen_range(10.0..1000.0_f64).round();
            h.xput_down = rng.gen_range(10.0..1000.0_f64).round();
            h.speedtest_ping = rng.gen_range(1.0..MAX_LATENCY_MS).round();
        }
        Subsystem::Vpn => {
            h.remote_user_num_active = rng.gen_range(0..10) as f64;
            h.remote_user_num_inactive = rng.gen_range(0..10) as f64;
            h.remote_user_rx_bytes = rng.gen_range(0.0..MAX_REMOTE_BYTES).round();
            h.remote_user_tx_bytes = rng.gen_range(0.0..MAX_REMOTE_BYTES).round();
            h.remote_user_rx_packets = (h.remote_user_rx_bytes / 1200.0).round();
            h.remote_user_tx_packets = (h.remote_user_tx_bytes / 1200.0).round();
        }
        Subsystem::Unknown(_) => {}
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_report_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        command_generate_report(path.clone(), 2).unwrap();

        let report = Report::load_from_file(&path).unwrap();
        assert_eq!(report.sites.len(), 2);
        assert_eq!(report.sites[0].name, "default");
        assert_eq!(report.sites[1].site_name, "Site 2 (site01)");
        assert_eq!(report.record_count(), 10);
        assert!(report.sites[0].health.iter().all(|h| h.subsystem.is_known()));
    }

    #[test]
    fn test_generated_vpn_record_has_no_throughput() {
        let mut rng = rand::thread_rng();
        let h = generate_health(&mut rng, Subsystem::Vpn);
        assert_eq!(h.tx_bytes_r, 0.0);
        assert_eq!(h.rx_bytes_r, 0.0);
    }
}
