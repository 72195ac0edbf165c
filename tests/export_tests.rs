//! Integration tests for the site export pipeline.
//!
//! These tests drive `SiteExporter` through the public API and check what
//! arrives at the sink: per-subsystem sample sets, label order, unit
//! conversion and behavior under parallel export.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use unifi_site_exporter::{
    CollectingSink, Health, Report, Sample, SampleSink, Site, SiteDescriptors, SiteExporter,
    SiteMetric, Subsystem, ValueKind, SITE_LABELS,
};

fn exporter(namespace: &str) -> SiteExporter {
    SiteExporter::new(Arc::new(SiteDescriptors::new(namespace).unwrap()))
}

fn site(name: &str, health: Vec<Health>) -> Site {
    Site {
        name: name.to_string(),
        desc: format!("{} office", name),
        site_name: format!("{} office ({})", name, name),
        health,
    }
}

fn export_one(health: Health) -> Vec<Sample> {
    let sink = CollectingSink::new();
    let report = Report::new(vec![site("default", vec![health])]);
    exporter("unifi").export_sites(Some(&report), &sink);
    sink.take()
}

fn metrics_of(samples: &[Sample]) -> Vec<SiteMetric> {
    let mut metrics: Vec<SiteMetric> = samples.iter().map(|s| s.metric).collect();
    metrics.sort();
    metrics
}

/// Multiset view of samples, independent of arrival order.
fn multiset(samples: &[Sample]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for s in samples {
        let key = format!("{:?}|{:?}|{}|{}", s.metric, s.kind, s.value, s.labels.join(","));
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[test]
fn test_lan_sample_set() {
    let mut lan = Health::new(Subsystem::Lan, "ok");
    lan.num_user = 12.0;
    lan.num_sw = 3.0;
    let samples = export_one(lan);

    let mut expected = vec![
        SiteMetric::TxBytesRate,
        SiteMetric::RxBytesRate,
        SiteMetric::NumAdopted,
        SiteMetric::NumDisconnected,
        SiteMetric::NumPending,
        SiteMetric::NumUser,
        SiteMetric::NumGuest,
        SiteMetric::NumIot,
        SiteMetric::NumSwitches,
    ];
    expected.sort();
    assert_eq!(metrics_of(&samples), expected);
    assert!(samples.iter().all(|s| s.kind == ValueKind::Gauge));

    let users = samples
        .iter()
        .find(|s| s.metric == SiteMetric::NumUser)
        .unwrap();
    assert_eq!(users.value, 12.0);
}

#[test]
fn test_sample_counts_per_subsystem() {
    let cases = [
        (Subsystem::Lan, 9),
        (Subsystem::Wan, 7),
        (Subsystem::Wlan, 10),
        (Subsystem::Www, 8),
        (Subsystem::Vpn, 6),
        (Subsystem::Unknown("dsl".into()), 0),
    ];
    for (subsystem, count) in cases {
        let samples = export_one(Health::new(subsystem.clone(), "ok"));
        assert_eq!(samples.len(), count, "subsystem {}", subsystem);
    }
}

#[test]
fn test_vpn_has_no_throughput_and_counts_as_counters() {
    let mut vpn = Health::new(Subsystem::Vpn, "ok");
    vpn.tx_bytes_r = 999.0;
    vpn.remote_user_rx_bytes = 4096.0;
    let samples = export_one(vpn);

    assert!(samples
        .iter()
        .all(|s| s.metric != SiteMetric::TxBytesRate && s.metric != SiteMetric::RxBytesRate));

    let counters: Vec<SiteMetric> = samples
        .iter()
        .filter(|s| s.kind == ValueKind::Counter)
        .map(|s| s.metric)
        .collect();
    assert_eq!(counters.len(), 4);
    assert!(counters.contains(&SiteMetric::RemoteUserRxBytes));

    let rx = samples
        .iter()
        .find(|s| s.metric == SiteMetric::RemoteUserRxBytes)
        .unwrap();
    assert_eq!(rx.value, 4096.0);
}

#[test]
fn test_www_latency_and_uptime() {
    let mut www = Health::new(Subsystem::Www, "ok");
    www.latency = 25.0;
    www.uptime = 86400.0;
    www.drops = 2.0;
    let samples = export_one(www);

    let value = |m: SiteMetric| samples.iter().find(|s| s.metric == m).unwrap().value;
    assert_eq!(value(SiteMetric::Latency), 0.025);
    // Uptime carries the raw latency reading, not the uptime field.
    assert_eq!(value(SiteMetric::Uptime), 25.0);

    let drops = samples
        .iter()
        .find(|s| s.metric == SiteMetric::Drops)
        .unwrap();
    assert_eq!(drops.kind, ValueKind::Counter);
    assert_eq!(drops.value, 2.0);
}

#[test]
fn test_label_order() {
    let samples = export_one(Health::new(Subsystem::Wlan, "warning"));
    assert_eq!(
        SITE_LABELS,
        ["subsystem", "status", "name", "desc", "site_name"]
    );
    for s in &samples {
        assert_eq!(
            s.labels,
            vec![
                "wlan".to_string(),
                "warning".to_string(),
                "default".to_string(),
                "default office".to_string(),
                "default office (default)".to_string(),
            ]
        );
    }
}

#[test]
fn test_export_is_idempotent() {
    let report = Report::new(
        (0..8)
            .map(|i| {
                let mut lan = Health::new(Subsystem::Lan, "ok");
                lan.num_user = i as f64;
                site(&format!("site{}", i), vec![lan, Health::new(Subsystem::Www, "ok")])
            })
            .collect(),
    );
    let exporter = exporter("unifi");

    let first = CollectingSink::new();
    let second = CollectingSink::new();
    let a = exporter.export_sites(Some(&report), &first);
    let b = exporter.export_sites(Some(&report), &second);

    assert_eq!(a.samples, b.samples);
    assert_eq!(multiset(&first.take()), multiset(&second.take()));
}

#[test]
fn test_absent_and_empty_reports_write_nothing() {
    let exporter = exporter("unifi");
    let sink = CollectingSink::new();

    let summary = exporter.export_sites(None, &sink);
    assert_eq!(summary.samples, 0);

    let summary = exporter.export_sites(Some(&Report::default()), &sink);
    assert_eq!(summary.sites, 0);
    assert_eq!(sink.batches(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_site_without_records_writes_nothing() {
    let sink = CollectingSink::new();
    let report = Report::new(vec![site("empty", vec![])]);
    let summary = exporter("unifi").export_sites(Some(&report), &sink);

    assert_eq!(summary.sites, 1);
    assert_eq!(summary.records, 0);
    assert_eq!(sink.batches(), 0);
}

/// Sink that counts samples per site name across threads.
#[derive(Default)]
struct PerSiteSink {
    by_site: std::sync::Mutex<HashMap<String, usize>>,
    sends: AtomicUsize,
}

impl SampleSink for PerSiteSink {
    fn send(&self, samples: Vec<Sample>) {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let mut map = self.by_site.lock().unwrap();
        for s in samples {
            *map.entry(s.labels[2].clone()).or_insert(0) += 1;
        }
    }
}

#[test]
fn test_every_site_exported_exactly_once() {
    let sites: Vec<Site> = (0..64)
        .map(|i| {
            site(
                &format!("site{:02}", i),
                vec![
                    Health::new(Subsystem::Lan, "ok"),
                    Health::new(Subsystem::Wan, "ok"),
                    Health::new(Subsystem::Vpn, "ok"),
                ],
            )
        })
        .collect();
    let report = Report::new(sites);

    let sink = PerSiteSink::default();
    let summary = exporter("unifi").export_sites(Some(&report), &sink);

    let by_site = sink.by_site.lock().unwrap();
    assert_eq!(by_site.len(), 64);
    assert!(by_site.values().all(|&n| n == 9 + 7 + 6));
    assert_eq!(summary.samples, 64 * 22);
    // lan: 4 groups, wan: 3 groups, vpn: 1 group
    assert_eq!(sink.sends.load(Ordering::SeqCst), 64 * 8);
}

#[test]
fn test_snapshot_with_loose_numbers() {
    let json = r#"[{"name": "lab", "desc": "Lab", "site_name": "Lab (lab)", "health": [
        {"subsystem": "wan", "status": "ok", "num_gw": "2", "num_sta": null,
         "num_adopted": true, "tx_bytes-r": 1.5e3, "rx_bytes-r": "junk"}
    ]}]"#;
    let report = Report::from_json(json).unwrap();
    let health = &report.sites[0].health[0];
    assert_eq!(health.subsystem, Subsystem::Wan);
    assert_eq!(health.num_gw, 2.0);
    assert_eq!(health.num_sta, 0.0);
    assert_eq!(health.num_adopted, 1.0);
    assert_eq!(health.tx_bytes_r, 1500.0);
    assert_eq!(health.rx_bytes_r, 0.0);

    let sink = CollectingSink::new();
    exporter("").export_sites(Some(&report), &sink);
    let samples = sink.take();
    assert_eq!(samples.len(), 7);
    assert!(samples.iter().all(|s| s.labels[0] == "wan"));
}

#[test]
fn test_subsystem_tag_is_matched_exactly() {
    let json = r#"[{"name": "lab", "desc": "Lab", "site_name": "Lab (lab)", "health": [
        {"subsystem": "LAN", "status": "ok", "num_user": 5},
        {"subsystem": "lan", "status": "ok", "num_user": 6}
    ]}]"#;
    let report = Report::from_json(json).unwrap();
    assert_eq!(
        report.sites[0].health[0].subsystem,
        Subsystem::Unknown("LAN".to_string())
    );
    assert_eq!(report.sites[0].health[0].subsystem.as_str(), "LAN");

    let sink = CollectingSink::new();
    let summary = exporter("unifi").export_sites(Some(&report), &sink);
    assert_eq!(summary.samples, 9);
    assert!(sink.take().iter().all(|s| s.labels[0] == "lan"));
}

#[test]
fn test_snapshot_file_roundtrip_through_exporter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    std::fs::write(
        &path,
        r#"{"sites": [{"name": "default", "desc": "HQ", "site_name": "HQ (default)",
            "health": [{"subsystem": "wlan", "status": "ok", "num_ap": 4}]}]}"#,
    )
    .unwrap();

    let report = Report::load_from_file(&path).unwrap();
    let sink = CollectingSink::new();
    let summary = exporter("unifi").export_sites(Some(&report), &sink);

    assert_eq!(summary.samples, 10);
    let ap = sink
        .samples()
        .into_iter()
        .find(|s| s.metric == SiteMetric::NumAp)
        .unwrap();
    assert_eq!(ap.value, 4.0);
}

#[test]
fn test_missing_snapshot_file() {
    let err = Report::load_from_file(std::path::Path::new("/nonexistent/report.json"))
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/report.json"));
}
