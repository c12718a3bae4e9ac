//! Alert Generator
//!
//! Turns raw risk-classified records into severity-tagged, human-readable
//! alerts. Built independently of baseline comparison - this is the
//! "what is concerning right now" view. Output ordering is a contract:
//! sorted by severity (high first) with a stable sort, so equal-severity
//! alerts keep generation order (processes, ports, startup, files).

use serde::{Deserialize, Serialize};

use crate::logic::records::{
    FileIntegrityRecord, IntegrityStatus, PortRecord, ProcessRecord, RiskLevel, StartupRecord,
};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Process,
    Port,
    Startup,
    File,
}

/// An ephemeral security finding. Generated per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: RiskLevel,
    pub title: String,
    pub description: String,
    pub timestamp: i64,
    pub resolved: bool,
}

impl Alert {
    fn new(alert_type: AlertType, severity: RiskLevel, title: String, description: String, timestamp: i64) -> Self {
        Alert {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type,
            severity,
            title,
            description,
            timestamp,
            resolved: false,
        }
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Generate alerts from raw scan records.
pub fn generate(
    processes: &[ProcessRecord],
    ports: &[PortRecord],
    startup_items: &[StartupRecord],
    file_integrity: &[FileIntegrityRecord],
) -> Vec<Alert> {
    let timestamp = chrono::Utc::now().timestamp();
    let mut alerts = Vec::new();

    for proc in processes {
        match proc.risk_level {
            RiskLevel::High => alerts.push(Alert::new(
                AlertType::Process,
                RiskLevel::High,
                format!("Suspicious Process: {}", proc.name),
                format!(
                    "Process '{}' (PID: {}) exhibits suspicious behavior. Running as user '{}' with {:.1}% CPU usage.",
                    proc.name,
                    proc.pid,
                    proc.username.as_deref().unwrap_or("unknown"),
                    proc.cpu_percent
                ),
                timestamp,
            )),
            RiskLevel::Medium => alerts.push(Alert::new(
                AlertType::Process,
                RiskLevel::Medium,
                format!("High Resource Usage: {}", proc.name),
                format!(
                    "Process '{}' is using {:.1}% CPU and {:.1}% memory.",
                    proc.name, proc.cpu_percent, proc.memory_percent
                ),
                timestamp,
            )),
            _ => {}
        }
    }

    for port in ports {
        let process = port.process_name.as_deref().unwrap_or("Unknown");
        match port.risk_level {
            RiskLevel::High => alerts.push(Alert::new(
                AlertType::Port,
                RiskLevel::High,
                format!("High-Risk Port Open: {}", port.local_port),
                format!(
                    "Port {} ({}) is open and associated with malware. Process: {}",
                    port.local_port,
                    port.protocol.to_uppercase(),
                    process
                ),
                timestamp,
            )),
            RiskLevel::Medium => alerts.push(Alert::new(
                AlertType::Port,
                RiskLevel::Medium,
                format!("Potentially Vulnerable Port: {}", port.local_port),
                format!(
                    "Port {} ({}) should be monitored. Process: {}",
                    port.local_port,
                    port.protocol.to_uppercase(),
                    process
                ),
                timestamp,
            )),
            _ => {}
        }
    }

    for item in startup_items {
        if item.risk_level.is_suspicious() {
            alerts.push(Alert::new(
                AlertType::Startup,
                item.risk_level,
                format!("Suspicious Startup Item: {}", item.name),
                format!(
                    "Startup item '{}' appears suspicious. Location: {}",
                    item.name, item.location
                ),
                timestamp,
            ));
        }
    }

    // File tampering is always acute, regardless of classifier output
    for file in file_integrity {
        match file.status {
            IntegrityStatus::Modified => alerts.push(Alert::new(
                AlertType::File,
                RiskLevel::High,
                "Critical File Modified".to_string(),
                format!(
                    "File '{}' has been modified. This may indicate a security breach.",
                    file.file_path
                ),
                timestamp,
            )),
            IntegrityStatus::Missing => alerts.push(Alert::new(
                AlertType::File,
                RiskLevel::High,
                "Critical File Missing".to_string(),
                format!("Critical file '{}' is missing from the system.", file.file_path),
                timestamp,
            )),
            _ => {}
        }
    }

    // Stable: equal severities keep generation order
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}

// ============================================================================
// TESTS
// ============================================================================
