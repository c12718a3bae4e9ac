//! Scan Record Types
//!
//! One concrete record type per scan category, each carrying the shared
//! `risk_level` assigned by the classifier at collection time. Records are
//! immutable values once produced.

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Per-record risk tier. Ordering follows severity: `Safe < Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Medium or high - the tiers that count as suspicious in metrics
    pub fn is_suspicious(&self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SCAN CATEGORIES
// ============================================================================

/// The four host introspection categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Processes,
    Ports,
    StartupItems,
    FileIntegrity,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Processes => "processes",
            Category::Ports => "ports",
            Category::StartupItems => "startup_items",
            Category::FileIntegrity => "file_integrity",
        };
        f.write_str(name)
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// A running process at capture time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// Owning user, if resolvable. Processes without one are suspicious.
    pub username: Option<String>,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub status: String,
    /// Unix timestamp of process start
    pub create_time: i64,
    pub cmdline: Vec<String>,
    pub risk_level: RiskLevel,
}

/// An open port / network connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortRecord {
    pub local_address: String,
    pub local_port: u16,
    pub remote_address: Option<String>,
    pub remote_port: Option<u16>,
    /// Normalized socket state, e.g. "LISTEN" or "ESTABLISHED"
    pub status: String,
    pub protocol: String,
    pub process_name: Option<String>,
    pub pid: Option<u32>,
    pub risk_level: RiskLevel,
}

/// An autostart entry (registry run key, startup folder, XDG autostart,
/// systemd unit - depending on platform)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupRecord {
    pub name: String,
    pub path: String,
    pub location: String,
    pub enabled: bool,
    pub publisher: Option<String>,
    pub risk_level: RiskLevel,
}

/// Outcome of hashing one critical file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityStatus {
    Safe,
    Modified,
    Missing,
    Error,
}

impl IntegrityStatus {
    /// Modified or missing - tampering that always warrants a high alert
    pub fn is_compromised(&self) -> bool {
        matches!(self, IntegrityStatus::Modified | IntegrityStatus::Missing)
    }
}

/// Integrity check result for one critical file path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIntegrityRecord {
    pub file_path: String,
    pub current_hash: Option<String>,
    pub expected_hash: Option<String>,
    /// Unix mtime, absent when the file is missing or unreadable
    pub last_modified: Option<i64>,
    pub status: IntegrityStatus,
    pub risk_level: RiskLevel,
}
