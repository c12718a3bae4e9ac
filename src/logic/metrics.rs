//! Metrics Aggregator
//!
//! Pure reduction of the four record lists into dashboard counters plus a
//! risk-level histogram over the union of all records. Recomputed on
//! demand, never persisted on its own.

use serde::{Deserialize, Serialize};

use crate::logic::records::{
    FileIntegrityRecord, PortRecord, ProcessRecord, RiskLevel, StartupRecord,
};

/// Risk-level histogram across every scanned record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskHistogram {
    pub safe: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskHistogram {
    fn bump(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Safe => self.safe += 1,
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

/// Scalar counters derived from one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_processes: usize,
    pub suspicious_processes: usize,
    pub open_ports: usize,
    pub high_risk_ports: usize,
    pub startup_items: usize,
    pub suspicious_startup: usize,
    pub file_changes: usize,
    pub alerts_count: RiskHistogram,
    /// Unix timestamp of the scan these counters describe
    pub last_scan: i64,
}

/// Reduce record lists into metrics. `last_scan` is the capture timestamp
/// so that the result stays deterministic for a given input.
pub fn aggregate(
    processes: &[ProcessRecord],
    ports: &[PortRecord],
    startup_items: &[StartupRecord],
    file_integrity: &[FileIntegrityRecord],
    last_scan: i64,
) -> Metrics {
    let mut alerts_count = RiskHistogram::default();
    for level in processes
        .iter()
        .map(|p| p.risk_level)
        .chain(ports.iter().map(|p| p.risk_level))
        .chain(startup_items.iter().map(|s| s.risk_level))
        .chain(file_integrity.iter().map(|f| f.risk_level))
    {
        alerts_count.bump(level);
    }

    Metrics {
        total_processes: processes.len(),
        suspicious_processes: processes
            .iter()
            .filter(|p| p.risk_level.is_suspicious())
            .count(),
        open_ports: ports.iter().filter(|p| p.status == "LISTEN").count(),
        high_risk_ports: ports
            .iter()
            .filter(|p| p.risk_level == RiskLevel::High)
            .count(),
        startup_items: startup_items.len(),
        suspicious_startup: startup_items
            .iter()
            .filter(|s| s.risk_level.is_suspicious())
            .count(),
        file_changes: file_integrity
            .iter()
            .filter(|f| f.status.is_compromised())
            .count(),
        alerts_count,
        last_scan,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::records::IntegrityStatus;

    fn process(name: &str, risk_level: RiskLevel) -> ProcessRecord {
        ProcessRecord {
            pid: 1,
            name: name.to_string(),
            username: Some("user".to_string()),
            cpu_percent: 1.0,
            memory_percent: 1.0,
            status: "Run".to_string(),
            create_time: 0,
            cmdline: vec![],
            risk_level,
        }
    }

    fn port(local_port: u16, status: &str, risk_level: RiskLevel) -> PortRecord {
        PortRecord {
            local_address: "0.0.0.0".to_string(),
            local_port,
            remote_address: None,
            remote_port: None,
            status: status.to_string(),
            protocol: "tcp".to_string(),
            process_name: None,
            pid: None,
            risk_level,
        }
    }

    fn file(path: &str, status: IntegrityStatus) -> FileIntegrityRecord {
        FileIntegrityRecord {
            file_path: path.to_string(),
            current_hash: None,
            expected_hash: None,
            last_modified: None,
            status,
            risk_level: crate::logic::risk::classify_file(status),
        }
    }

    #[test]
    fn test_aggregate_counts() {
        let processes = vec![
            process("chrome", RiskLevel::Safe),
            process("miner", RiskLevel::High),
            process("tmp-helper", RiskLevel::Medium),
        ];
        let ports = vec![
            port(22, "LISTEN", RiskLevel::Safe),
            port(4444, "LISTEN", RiskLevel::High),
            port(50000, "ESTABLISHED", RiskLevel::Low),
        ];
        let files = vec![
            file("/etc/hosts", IntegrityStatus::Modified),
            file("/etc/passwd", IntegrityStatus::Safe),
            file("/etc/shadow", IntegrityStatus::Error),
        ];

        let metrics = aggregate(&processes, &ports, &[], &files, 1_700_000_000);

        assert_eq!(metrics.total_processes, 3);
        assert_eq!(metrics.suspicious_processes, 2);
        assert_eq!(metrics.open_ports, 2);
        assert_eq!(metrics.high_risk_ports, 1);
        assert_eq!(metrics.startup_items, 0);
        assert_eq!(metrics.file_changes, 1);
        assert_eq!(metrics.last_scan, 1_700_000_000);
    }

    #[test]
    fn test_histogram_spans_all_categories() {
        let processes = vec![process("a", RiskLevel::Safe)];
        let ports = vec![port(23, "LISTEN", RiskLevel::Medium)];
        let files = vec![file("/etc/hosts", IntegrityStatus::Missing)];

        let metrics = aggregate(&processes, &ports, &[], &files, 0);

        assert_eq!(metrics.alerts_count.safe, 1);
        assert_eq!(metrics.alerts_count.medium, 1);
        assert_eq!(metrics.alerts_count.high, 1);
        assert_eq!(metrics.alerts_count.low, 0);
    }

    #[test]
    fn test_aggregate_empty_is_zeroed() {
        let metrics = aggregate(&[], &[], &[], &[], 42);
        assert_eq!(metrics, Metrics { last_scan: 42, ..Default::default() });
    }
}
