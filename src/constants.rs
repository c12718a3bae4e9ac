//! Central Configuration Constants
//!
//! Single source of truth for the static risk tables, scoring weights and
//! server defaults. To tune what counts as suspicious, only edit this file.

use std::path::PathBuf;

/// App name
pub const APP_NAME: &str = "HostAudit";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Per-category collection timeout (seconds)
///
/// A hung collector must not block snapshot assembly forever; after this
/// long the category is recorded as failed and assembly continues.
pub const COLLECT_TIMEOUT_SECS: u64 = 20;

// ============================================================================
// RISK TABLES - PROCESSES
// ============================================================================

/// Keywords in a process name or command line that mark it high risk
pub const HIGH_RISK_PROCESS_KEYWORDS: &[&str] = &[
    "miner", "crypto", "trojan", "keylogger", "backdoor", "ransomware", "rootkit",
];

/// Keywords that mark a process medium risk
pub const MEDIUM_RISK_PROCESS_KEYWORDS: &[&str] = &["unknown", "suspicious", "temp", "tmp"];

/// CPU usage (%) above which a process is at least medium risk
pub const HIGH_CPU_THRESHOLD: f32 = 80.0;

// ============================================================================
// RISK TABLES - PORTS
// ============================================================================

/// Ports commonly used by malware
pub const HIGH_RISK_PORTS: &[u16] = &[
    1337,  // Elite/Leet
    4444,  // Metasploit default
    5555,  // Common backdoor
    6666,  // IRC bot
    31337, // Back Orifice
    12345, // NetBus
    54321, // Back Orifice 2000
];

/// Unencrypted/legacy protocol ports worth monitoring
pub const MEDIUM_RISK_PORTS: &[u16] = &[
    21,   // FTP
    23,   // Telnet
    135,  // Windows RPC
    139,  // NetBIOS
    445,  // SMB
    3389, // RDP
];

/// Ports strictly above this are dynamic/private range
pub const EPHEMERAL_PORT_MIN: u16 = 49152;

// ============================================================================
// RISK TABLES - STARTUP ITEMS
// ============================================================================

/// Keywords in a startup item name or path that mark it high risk
pub const HIGH_RISK_STARTUP_KEYWORDS: &[&str] = &[
    "miner", "crypto", "unknown", "suspicious", "temp", "tmp", "backdoor", "trojan",
];

/// Path substrings mapped to a resolved publisher name
pub const KNOWN_PUBLISHERS: &[(&str, &str)] = &[
    ("microsoft", "Microsoft Corporation"),
    ("google", "Google LLC"),
    ("adobe", "Adobe Systems"),
    ("nvidia", "NVIDIA Corporation"),
    ("intel", "Intel Corporation"),
];

// ============================================================================
// RISK SCORING WEIGHTS
// ============================================================================

/// Score contribution per newly added process, by risk level
pub const SCORE_PROCESS_HIGH: f64 = 20.0;
pub const SCORE_PROCESS_MEDIUM: f64 = 10.0;
pub const SCORE_PROCESS_LOW: f64 = 3.0;

/// Score contribution per newly added port
pub const SCORE_PORT_HIGH: f64 = 15.0;
pub const SCORE_PORT_MEDIUM: f64 = 8.0;

/// Score contribution per newly added startup item
pub const SCORE_STARTUP_HIGH: f64 = 25.0;
pub const SCORE_STARTUP_MEDIUM: f64 = 12.0;

/// Risk scores are capped here
pub const RISK_SCORE_CAP: f64 = 100.0;

/// Score thresholds mapping to discrete risk levels
pub const RISK_HIGH_THRESHOLD: f64 = 70.0;
pub const RISK_MEDIUM_THRESHOLD: f64 = 40.0;
pub const RISK_LOW_THRESHOLD: f64 = 10.0;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get HTTP listen port from environment or use default
pub fn get_port() -> u16 {
    std::env::var("HOSTAUDIT_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get data directory from environment or use the platform default
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HOSTAUDIT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hostaudit")
}
