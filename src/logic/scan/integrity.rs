//! File Integrity Collector
//!
//! Hashes a fixed list of critical system files with SHA-256 and reports
//! per-file status. When expected hashes from a stored baseline are
//! supplied, mismatches surface as `modified`.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::logic::records::{FileIntegrityRecord, IntegrityStatus};
use crate::logic::risk;

// ============================================================================
// CRITICAL FILE LISTS
// ============================================================================

#[cfg(target_os = "windows")]
const CRITICAL_FILES: &[&str] = &[
    r"C:\Windows\System32\drivers\etc\hosts",
    r"C:\Windows\System32\ntdll.dll",
    r"C:\Windows\System32\kernel32.dll",
    r"C:\Windows\System32\user32.dll",
    r"C:\Windows\System32\advapi32.dll",
];

#[cfg(not(target_os = "windows"))]
const CRITICAL_FILES: &[&str] = &[
    "/etc/hosts",
    "/etc/passwd",
    "/etc/shadow",
    "/etc/sudoers",
    "/bin/bash",
    "/bin/sh",
    "/usr/bin/sudo",
];

/// Platform-appropriate list of critical files to monitor
pub fn critical_files() -> Vec<String> {
    CRITICAL_FILES.iter().map(|p| p.to_string()).collect()
}

// ============================================================================
// SCANNING
// ============================================================================

/// Check the integrity of the given paths.
///
/// Total per path: unreadable files become `error` records, absent files
/// become `missing`. Never fails as a whole.
pub fn scan_files(
    paths: &[String],
    expected: Option<&HashMap<String, String>>,
) -> Vec<FileIntegrityRecord> {
    paths
        .iter()
        .map(|path| {
            let expected_hash = expected.and_then(|m| m.get(path)).cloned();
            check_file(path, expected_hash)
        })
        .collect()
}

fn check_file(path: &str, expected_hash: Option<String>) -> FileIntegrityRecord {
    if !Path::new(path).exists() {
        let status = IntegrityStatus::Missing;
        return FileIntegrityRecord {
            file_path: path.to_string(),
            current_hash: None,
            expected_hash,
            last_modified: None,
            status,
            risk_level: risk::classify_file(status),
        };
    }

    match hash_file(Path::new(path)) {
        Ok(current_hash) => {
            let last_modified = fs::metadata(path)
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64);

            let status = match &expected_hash {
                Some(expected) if *expected != current_hash => IntegrityStatus::Modified,
                _ => IntegrityStatus::Safe,
            };

            FileIntegrityRecord {
                file_path: path.to_string(),
                current_hash: Some(current_hash),
                expected_hash,
                last_modified,
                status,
                risk_level: risk::classify_file(status),
            }
        }
        Err(e) => {
            log::warn!("Failed to hash {}: {}", path, e);
            let status = IntegrityStatus::Error;
            FileIntegrityRecord {
                file_path: path.to_string(),
                current_hash: None,
                expected_hash,
                last_modified: None,
                status,
                risk_level: risk::classify_file(status),
            }
        }
    }
}

/// Re-check current records against the hashes recorded in a baseline.
///
/// Used by the live scan endpoints: a file whose current hash differs from
/// the one captured in the baseline flips to `modified` regardless of what
/// the stateless scan reported.
pub fn verify_against(
    baseline_records: &[FileIntegrityRecord],
    current_records: Vec<FileIntegrityRecord>,
) -> Vec<FileIntegrityRecord> {
    let expected: HashMap<&str, &str> = baseline_records
        .iter()
        .filter_map(|r| {
            r.current_hash
                .as_deref()
                .map(|h| (r.file_path.as_str(), h))
        })
        .collect();

    current_records
        .into_iter()
        .map(|mut record| {
            let Some(expected_hash) = expected.get(record.file_path.as_str()) else {
                return record;
            };

            record.expected_hash = Some(expected_hash.to_string());
            if record.status == IntegrityStatus::Safe {
                if record.current_hash.as_deref() != Some(*expected_hash) {
                    record.status = IntegrityStatus::Modified;
                    record.risk_level = risk::classify_file(IntegrityStatus::Modified);
                }
            }
            record
        })
        .collect()
}

/// SHA-256 of a file, streamed in chunks
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("sha256:{:x}", hasher.finalize()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::records::RiskLevel;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, body: &[u8]) -> String {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(body).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_hash_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "hosts", b"127.0.0.1 localhost\n");

        let hash = hash_file(Path::new(&path)).unwrap();
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), "sha256:".len() + 64);

        // Deterministic
        assert_eq!(hash, hash_file(Path::new(&path)).unwrap());
    }

    #[test]
    fn test_missing_file_is_high_risk() {
        let records = scan_files(&["/nonexistent/path/hosts".to_string()], None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, IntegrityStatus::Missing);
        assert_eq!(records[0].risk_level, RiskLevel::High);
        assert_eq!(records[0].current_hash, None);
    }

    #[test]
    fn test_unmodified_file_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "passwd", b"root:x:0:0\n");

        let records = scan_files(&[path], None);
        assert_eq!(records[0].status, IntegrityStatus::Safe);
        assert_eq!(records[0].risk_level, RiskLevel::Safe);
        assert!(records[0].last_modified.is_some());
    }

    #[test]
    fn test_expected_hash_mismatch_is_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "hosts", b"tampered contents\n");

        let mut expected = HashMap::new();
        expected.insert(path.clone(), "sha256:deadbeef".to_string());

        let records = scan_files(&[path], Some(&expected));
        assert_eq!(records[0].status, IntegrityStatus::Modified);
        assert_eq!(records[0].risk_level, RiskLevel::High);
        assert_eq!(records[0].expected_hash.as_deref(), Some("sha256:deadbeef"));
    }

    #[test]
    fn test_verify_against_baseline_flags_modified() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "hosts", b"original\n");

        // Capture the baseline, then tamper with the file
        let baseline = scan_files(&[path.clone()], None);
        fs::write(&path, b"tampered\n").unwrap();
        let current = scan_files(&[path.clone()], None);

        let verified = verify_against(&baseline, current);
        assert_eq!(verified[0].status, IntegrityStatus::Modified);
        assert_eq!(verified[0].risk_level, RiskLevel::High);
        assert_eq!(
            verified[0].expected_hash,
            baseline[0].current_hash
        );
    }

    #[test]
    fn test_verify_against_baseline_keeps_untouched_safe() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "sudoers", b"stable\n");

        let baseline = scan_files(&[path.clone()], None);
        let current = scan_files(&[path], None);

        let verified = verify_against(&baseline, current);
        assert_eq!(verified[0].status, IntegrityStatus::Safe);
    }
}
