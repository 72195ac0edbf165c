//! Check command implementation.
//!
//! Validates the configuration and the report snapshot.

use ahash::AHashMap as HashMap;
use unifi_site_exporter::{sample_count, Report, SiteDescriptors};

use crate::config::{validate_effective_config, Config};

/// Validates configuration and the snapshot it points at.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 UniFi Site Exporter - Check");
    println!("==============================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n🏷️  Checking metric descriptors...");
    match SiteDescriptors::new(config.namespace()) {
        Ok(descriptors) => println!(
            "   ✅ {} descriptors built for namespace {:?}",
            descriptors.len(),
            descriptors.namespace()
        ),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📄 Checking report snapshot...");
    match &config.report_file {
        None => {
            println!("   ❌ report_file is not set");
            all_ok = false;
        }
        Some(path) => match Report::load_from_file(path) {
            Ok(report) => {
                println!(
                    "   ✅ {} sites, {} health records",
                    report.sites.len(),
                    report.record_count()
                );

                let mut unknown: HashMap<String, usize> = HashMap::new();
                let mut expected_samples = 0;
                for health in report.sites.iter().flat_map(|s| s.health.iter()) {
                    if !health.subsystem.is_known() {
                        *unknown.entry(health.subsystem.to_string()).or_default() += 1;
                    }
                    expected_samples += sample_count(&health.subsystem);
                }
                println!("   ✅ {} samples per export cycle", expected_samples);

                for (subsystem, count) in &unknown {
                    println!(
                        "   ⚠️  {} records with unknown subsystem {:?} (not exported)",
                        count, subsystem
                    );
                }
            }
            Err(e) => {
                println!("   ❌ {}", e);
                all_ok = false;
            }
        },
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the output above");
        std::process::exit(1);
    }
}
