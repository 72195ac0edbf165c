//! Report snapshot source.
//!
//! Reads the controller snapshot from disk and keeps it for `cache_ttl`
//! seconds. When a reload fails the previous snapshot stays in service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};
use unifi_site_exporter::{ExportStats, Report, ReportError};

/// Cached snapshot with its load metadata.
#[derive(Default)]
pub struct ReportCache {
    pub report: Option<Arc<Report>>,
    pub last_loaded: Option<Instant>,
    pub last_load_success: bool,
    pub last_error: Option<String>,
}

/// File-backed report source.
pub struct ReportSource {
    path: PathBuf,
    ttl: Duration,
    cache: RwLock<ReportCache>,
}

impl ReportSource {
    pub fn new(path: PathBuf, ttl_secs: u64) -> Self {
        Self {
            path,
            ttl: Duration::from_secs(ttl_secs),
            cache: RwLock::new(ReportCache::default()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Returns the current snapshot, reloading it first when stale.
    pub async fn current(&self, stats: &ExportStats) -> Option<Arc<Report>> {
        let stale = {
            let cache = self.cache.read().await;
            cache
                .last_loaded
                .map(|t| t.elapsed() >= self.ttl)
                .unwrap_or(true)
        };

        if stale {
            self.reload(stats).await;
        }

        self.cache.read().await.report.clone()
    }

    /// Re-reads the snapshot file. Keeps the old snapshot on failure.
    #[instrument(skip(self, stats), fields(path = %self.path.display()))]
    pub async fn reload(&self, stats: &ExportStats) {
        let start = Instant::now();
        let path = self.path.clone();

        let result = tokio::task::spawn_blocking(move || Report::load_from_file(&path))
            .await
            .unwrap_or_else(|e| {
                Err(ReportError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    e.to_string(),
                )))
            });

        let mut cache = self.cache.write().await;
        cache.last_loaded = Some(Instant::now());

        match result {
            Ok(report) => {
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                stats.record_report_load(elapsed_ms);
                info!(
                    "Report reloaded: {} sites, {} health records ({:.1}ms)",
                    report.sites.len(),
                    report.record_count(),
                    elapsed_ms
                );
                cache.report = Some(Arc::new(report));
                cache.last_load_success = true;
                cache.last_error = None;
            }
            Err(e) => {
                stats.record_report_load_failure();
                error!("Failed to reload report: {}", e);
                if cache.report.is_some() {
                    debug!("Serving previous report snapshot");
                }
                cache.last_load_success = false;
                cache.last_error = Some(e.to_string());
            }
        }
    }

    /// `(load_success, last_error)` of the most recent load.
    pub async fn status(&self) -> (bool, Option<String>) {
        let cache = self.cache.read().await;
        (cache.last_load_success, cache.last_error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{"sites": [{"name": "default", "desc": "HQ", "site_name": "HQ (default)",
        "health": [{"subsystem": "lan", "status": "ok", "num_user": 4}]}]}"#;

    #[tokio::test]
    async fn test_loads_and_caches_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let stats = ExportStats::new();
        let source = ReportSource::new(file.path().to_path_buf(), 60);
        let report = source.current(&stats).await.unwrap();
        assert_eq!(report.sites.len(), 1);
        assert_eq!(report.sites[0].health[0].num_user, 4.0);

        source.current(&stats).await;
        assert_eq!(
            stats.report_loads.load(std::sync::atomic::Ordering::Relaxed),
            1
        );
        assert_eq!(source.status().await, (true, None));
    }

    #[tokio::test]
    async fn test_keeps_previous_snapshot_on_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let stats = ExportStats::new();
        let source = ReportSource::new(file.path().to_path_buf(), 0);
        assert!(source.current(&stats).await.is_some());

        std::fs::write(file.path(), "{ broken").unwrap();
        let report = source.current(&stats).await;
        assert_eq!(report.map(|r| r.sites.len()), Some(1));

        let (ok, err) = source.status().await;
        assert!(!ok);
        assert!(err.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_yields_no_report() {
        let stats = ExportStats::new();
        let source = ReportSource::new(PathBuf::from("/nonexistent/report.json"), 30);
        assert!(source.current(&stats).await.is_none());
        assert_eq!(stats.get_report_load_success_rate(), 0.0);
    }
}
