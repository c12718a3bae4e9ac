//! Snapshot Assembler
//!
//! Runs the four collectors concurrently, joins them behind a bounded
//! per-category timeout, and bundles the results with derived metrics into
//! one immutable `Snapshot`. A category that fails or times out becomes an
//! empty list plus a recorded warning - never a silently dropped section
//! and never an aborted snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::COLLECT_TIMEOUT_SECS;
use crate::logic::metrics::{self, Metrics};
use crate::logic::records::{
    Category, FileIntegrityRecord, PortRecord, ProcessRecord, StartupRecord,
};
use crate::logic::scan::HostScanner;

// ============================================================================
// TYPES
// ============================================================================

/// Trace of a collector that could not deliver its category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionWarning {
    pub category: Category,
    pub message: String,
}

/// Point-in-time bundle of host state. Never mutated once assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub processes: Vec<ProcessRecord>,
    pub ports: Vec<PortRecord>,
    pub startup_items: Vec<StartupRecord>,
    pub file_integrity: Vec<FileIntegrityRecord>,
    pub metrics: Metrics,
    #[serde(default)]
    pub warnings: Vec<CollectionWarning>,
    pub captured_at: DateTime<Utc>,
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Capture a fresh snapshot of the host.
///
/// The four categories are independent read-only inspections and run
/// concurrently; assembly is the synchronization barrier.
pub async fn capture(scanner: Arc<dyn HostScanner>) -> Snapshot {
    let (processes, ports, startup_items, file_integrity) = tokio::join!(
        collect_category(Category::Processes, {
            let s = scanner.clone();
            move || s.collect_processes()
        }),
        collect_category(Category::Ports, {
            let s = scanner.clone();
            move || s.collect_ports()
        }),
        collect_category(Category::StartupItems, {
            let s = scanner.clone();
            move || s.collect_startup_items()
        }),
        collect_category(Category::FileIntegrity, {
            let s = scanner.clone();
            move || {
                let paths = s.critical_file_paths();
                s.collect_file_integrity(&paths, None)
            }
        }),
    );

    let mut warnings = Vec::new();
    let (processes, w) = processes;
    warnings.extend(w);
    let (ports, w) = ports;
    warnings.extend(w);
    let (startup_items, w) = startup_items;
    warnings.extend(w);
    let (file_integrity, w) = file_integrity;
    warnings.extend(w);

    let captured_at = Utc::now();
    let metrics = metrics::aggregate(
        &processes,
        &ports,
        &startup_items,
        &file_integrity,
        captured_at.timestamp(),
    );

    Snapshot {
        processes,
        ports,
        startup_items,
        file_integrity,
        metrics,
        warnings,
        captured_at,
    }
}

/// Run one collector on the blocking pool with a bounded timeout.
/// Failure is recovered into an empty list plus a warning.
async fn collect_category<T, F>(
    category: Category,
    collect: F,
) -> (Vec<T>, Option<CollectionWarning>)
where
    T: Send + 'static,
    F: FnOnce() -> crate::logic::error::EngineResult<Vec<T>> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(collect);

    match tokio::time::timeout(Duration::from_secs(COLLECT_TIMEOUT_SECS), task).await {
        Ok(Ok(Ok(records))) => (records, None),
        Ok(Ok(Err(e))) => {
            log::warn!("Collection failed for {}: {}", category, e);
            (
                Vec::new(),
                Some(CollectionWarning {
                    category,
                    message: e.to_string(),
                }),
            )
        }
        Ok(Err(join_err)) => {
            log::error!("Collector task for {} panicked: {}", category, join_err);
            (
                Vec::new(),
                Some(CollectionWarning {
                    category,
                    message: format!("collector task failed: {}", join_err),
                }),
            )
        }
        Err(_) => {
            log::warn!(
                "Collection for {} timed out after {}s",
                category,
                COLLECT_TIMEOUT_SECS
            );
            (
                Vec::new(),
                Some(CollectionWarning {
                    category,
                    message: format!("timed out after {}s", COLLECT_TIMEOUT_SECS),
                }),
            )
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::error::{EngineError, EngineResult};
    use crate::logic::records::RiskLevel;
    use std::collections::HashMap;

    /// Scanner returning canned data, with ports rigged to fail
    struct FixtureScanner {
        fail_ports: bool,
    }

    impl HostScanner for FixtureScanner {
        fn collect_processes(&self) -> EngineResult<Vec<ProcessRecord>> {
            Ok(vec![ProcessRecord {
                pid: 42,
                name: "chrome".to_string(),
                username: Some("user".to_string()),
                cpu_percent: 3.0,
                memory_percent: 8.0,
                status: "Run".to_string(),
                create_time: 0,
                cmdline: vec!["chrome".to_string()],
                risk_level: RiskLevel::Safe,
            }])
        }

        fn collect_ports(&self) -> EngineResult<Vec<PortRecord>> {
            if self.fail_ports {
                Err(EngineError::collection(Category::Ports, "ss unavailable"))
            } else {
                Ok(Vec::new())
            }
        }

        fn collect_startup_items(&self) -> EngineResult<Vec<StartupRecord>> {
            Ok(Vec::new())
        }

        fn collect_file_integrity(
            &self,
            paths: &[String],
            _expected: Option<&HashMap<String, String>>,
        ) -> EngineResult<Vec<FileIntegrityRecord>> {
            assert_eq!(paths, self.critical_file_paths().as_slice());
            Ok(Vec::new())
        }

        fn critical_file_paths(&self) -> Vec<String> {
            vec!["/etc/hosts".to_string()]
        }
    }

    #[tokio::test]
    async fn test_capture_assembles_all_categories() {
        let snapshot = capture(Arc::new(FixtureScanner { fail_ports: false })).await;

        assert_eq!(snapshot.processes.len(), 1);
        assert!(snapshot.warnings.is_empty());
        assert_eq!(snapshot.metrics.total_processes, 1);
        assert_eq!(snapshot.metrics.last_scan, snapshot.captured_at.timestamp());
    }

    #[tokio::test]
    async fn test_failed_category_becomes_warning() {
        let snapshot = capture(Arc::new(FixtureScanner { fail_ports: true })).await;

        // The failed category is empty but traced; the others still land
        assert_eq!(snapshot.processes.len(), 1);
        assert!(snapshot.ports.is_empty());
        assert_eq!(snapshot.warnings.len(), 1);
        assert_eq!(snapshot.warnings[0].category, Category::Ports);
        assert!(snapshot.warnings[0].message.contains("ss unavailable"));
    }
}
