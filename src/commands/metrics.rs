//! Metrics command implementation.
//!
//! Lists every exported metric with its group and value kind.

use unifi_site_exporter::{groups_for, MetricGroup, SiteDescriptors, Subsystem};

use crate::config::Config;

/// Prints the metric catalogue, optionally for one subsystem only.
pub fn command_metrics(
    subsystem: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let descriptors = SiteDescriptors::new(config.namespace())?;

    let groups: Vec<MetricGroup> = match &subsystem {
        Some(raw) => {
            let subsystem = Subsystem::parse(&raw.to_ascii_lowercase());
            if !subsystem.is_known() {
                return Err(format!(
                    "Unknown subsystem '{}', expected one of lan/wan/wlan/www/vpn",
                    raw
                )
                .into());
            }
            groups_for(&subsystem)
        }
        None => MetricGroup::ALL.to_vec(),
    };

    println!("📊 UniFi Site Exporter - Metrics");
    println!("================================");

    let mut total = 0;
    for group in groups {
        println!("\n🏷️  Group: {}", group);
        println!("{}", "─".repeat(50));
        for (metric, kind) in group.members() {
            let name = descriptors.fq_name(*metric);
            println!("   ├─ {:45} {:8} {}", name, kind.to_string(), metric.help());
            total += 1;
        }
    }

    match subsystem {
        Some(raw) => println!("\n📋 {} samples per {} health record", total, raw),
        None => println!("\n📋 Total: {} metric series definitions", total),
    }

    Ok(())
}
