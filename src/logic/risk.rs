//! Risk Classifier
//!
//! Pure per-record classification driven by the static tables in
//! `constants`. No state, no I/O; deterministic so that scoring stays
//! reproducible. Precedence is always high, then medium, then low.

use crate::constants::{
    EPHEMERAL_PORT_MIN, HIGH_CPU_THRESHOLD, HIGH_RISK_PORTS, HIGH_RISK_PROCESS_KEYWORDS,
    HIGH_RISK_STARTUP_KEYWORDS, KNOWN_PUBLISHERS, MEDIUM_RISK_PORTS,
    MEDIUM_RISK_PROCESS_KEYWORDS,
};
use crate::logic::records::{IntegrityStatus, RiskLevel};

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify a process from its identity and resource usage
pub fn classify_process(
    name: &str,
    cmdline: &[String],
    cpu_percent: f32,
    username: Option<&str>,
) -> RiskLevel {
    let name_lower = name.to_lowercase();
    let cmdline_lower = cmdline.join(" ").to_lowercase();

    if contains_any(&name_lower, HIGH_RISK_PROCESS_KEYWORDS)
        || contains_any(&cmdline_lower, HIGH_RISK_PROCESS_KEYWORDS)
    {
        return RiskLevel::High;
    }

    if cpu_percent > HIGH_CPU_THRESHOLD || contains_any(&name_lower, MEDIUM_RISK_PROCESS_KEYWORDS) {
        return RiskLevel::Medium;
    }

    // No owning user identity hints at system manipulation
    if username.map_or(true, |u| u.is_empty()) {
        return RiskLevel::Low;
    }

    RiskLevel::Safe
}

/// Classify an open port by its local port number
pub fn classify_port(local_port: u16) -> RiskLevel {
    if HIGH_RISK_PORTS.contains(&local_port) {
        return RiskLevel::High;
    }

    if MEDIUM_RISK_PORTS.contains(&local_port) {
        return RiskLevel::Medium;
    }

    // Dynamic/private range - benign but worth watching
    if local_port > EPHEMERAL_PORT_MIN {
        return RiskLevel::Low;
    }

    RiskLevel::Safe
}

/// Classify a startup item from its name and path/command.
///
/// The unresolved-publisher downgrade is platform-specific and applied by
/// the Windows collector, not here.
pub fn classify_startup(name: &str, path: &str) -> RiskLevel {
    let name_lower = name.to_lowercase();
    let path_lower = path.to_lowercase();

    if contains_any(&name_lower, HIGH_RISK_STARTUP_KEYWORDS)
        || contains_any(&path_lower, HIGH_RISK_STARTUP_KEYWORDS)
    {
        return RiskLevel::High;
    }

    if path_lower.contains("temp") || path_lower.contains("tmp") {
        return RiskLevel::Medium;
    }

    RiskLevel::Safe
}

/// Classify a file integrity result from its status
pub fn classify_file(status: IntegrityStatus) -> RiskLevel {
    match status {
        IntegrityStatus::Modified | IntegrityStatus::Missing => RiskLevel::High,
        IntegrityStatus::Error => RiskLevel::Medium,
        IntegrityStatus::Safe => RiskLevel::Safe,
    }
}

/// Resolve a publisher from a file path using the known-publisher table
pub fn resolve_publisher(path: &str) -> Option<&'static str> {
    let path_lower = path.to_lowercase();
    KNOWN_PUBLISHERS
        .iter()
        .find(|(keyword, _)| path_lower.contains(keyword))
        .map(|(_, publisher)| *publisher)
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystack.contains(k))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_high_risk_keyword_wins() {
        // High keyword outranks the CPU rule
        let risk = classify_process("bitcoin-miner", &[], 95.0, Some("root"));
        assert_eq!(risk, RiskLevel::High);
    }

    #[test]
    fn test_process_high_risk_from_cmdline() {
        let cmdline = vec!["/usr/bin/python3".to_string(), "keylogger.py".to_string()];
        assert_eq!(
            classify_process("python3", &cmdline, 1.0, Some("user")),
            RiskLevel::High
        );
    }

    #[test]
    fn test_process_cpu_threshold() {
        assert_eq!(
            classify_process("encoder", &[], 80.1, Some("user")),
            RiskLevel::Medium
        );
        assert_eq!(
            classify_process("encoder", &[], 80.0, Some("user")),
            RiskLevel::Safe
        );
    }

    #[test]
    fn test_process_missing_user_is_low() {
        assert_eq!(classify_process("svchost", &[], 2.0, None), RiskLevel::Low);
    }

    #[test]
    fn test_process_matching_is_case_insensitive() {
        assert_eq!(
            classify_process("TROJAN.exe", &[], 0.0, Some("user")),
            RiskLevel::High
        );
    }

    #[test]
    fn test_port_tables() {
        assert_eq!(classify_port(4444), RiskLevel::High);
        assert_eq!(classify_port(23), RiskLevel::Medium);
        assert_eq!(classify_port(443), RiskLevel::Safe);
    }

    #[test]
    fn test_ephemeral_port_boundary() {
        // Strictly above the threshold
        assert_eq!(classify_port(EPHEMERAL_PORT_MIN), RiskLevel::Safe);
        assert_eq!(classify_port(EPHEMERAL_PORT_MIN + 1), RiskLevel::Low);
    }

    #[test]
    fn test_startup_keyword_precedence() {
        // "tmp" sits in the high-risk startup table, so it outranks the
        // temp-directory medium rule
        assert_eq!(
            classify_startup("updater", "/home/user/.cache/tmpdir/run.sh"),
            RiskLevel::High
        );
        assert_eq!(
            classify_startup("updater", "/opt/vendor/updater"),
            RiskLevel::Safe
        );
        assert_eq!(
            classify_startup("backdoor-helper", "/usr/bin/helper"),
            RiskLevel::High
        );
    }

    #[test]
    fn test_file_status_classification() {
        assert_eq!(classify_file(IntegrityStatus::Modified), RiskLevel::High);
        assert_eq!(classify_file(IntegrityStatus::Missing), RiskLevel::High);
        assert_eq!(classify_file(IntegrityStatus::Error), RiskLevel::Medium);
        assert_eq!(classify_file(IntegrityStatus::Safe), RiskLevel::Safe);
    }

    #[test]
    fn test_resolve_publisher() {
        assert_eq!(
            resolve_publisher(r"C:\Program Files\Microsoft\OneDrive.exe"),
            Some("Microsoft Corporation")
        );
        assert_eq!(resolve_publisher("/opt/obscure/tool"), None);
    }
}
