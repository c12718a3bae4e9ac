//! Host Scan Collectors
//!
//! Producers of the four typed record lists. Everything platform-specific
//! (socket enumeration commands, autostart locations, critical file lists)
//! lives behind the `HostScanner` capability trait so the engine itself
//! never branches on platform.

pub mod integrity;
pub mod ports;
pub mod processes;
pub mod startup;

use std::collections::HashMap;

use crate::logic::error::EngineResult;
use crate::logic::records::{FileIntegrityRecord, PortRecord, ProcessRecord, StartupRecord};

/// Capability interface over host introspection.
///
/// Each method is a point-in-time, read-only inspection and may fail
/// independently; snapshot assembly recovers per-category failures.
pub trait HostScanner: Send + Sync {
    fn collect_processes(&self) -> EngineResult<Vec<ProcessRecord>>;

    fn collect_ports(&self) -> EngineResult<Vec<PortRecord>>;

    fn collect_startup_items(&self) -> EngineResult<Vec<StartupRecord>>;

    /// Hash the given paths. When `expected` carries previously recorded
    /// hashes, mismatches are reported as modified.
    fn collect_file_integrity(
        &self,
        paths: &[String],
        expected: Option<&HashMap<String, String>>,
    ) -> EngineResult<Vec<FileIntegrityRecord>>;

    /// Platform-appropriate list of critical files to integrity-check
    fn critical_file_paths(&self) -> Vec<String>;
}

/// Scanner backed by the live operating system
pub struct SystemScanner;

impl SystemScanner {
    pub fn new() -> Self {
        SystemScanner
    }
}

impl Default for SystemScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl HostScanner for SystemScanner {
    fn collect_processes(&self) -> EngineResult<Vec<ProcessRecord>> {
        processes::collect()
    }

    fn collect_ports(&self) -> EngineResult<Vec<PortRecord>> {
        ports::collect()
    }

    fn collect_startup_items(&self) -> EngineResult<Vec<StartupRecord>> {
        startup::collect()
    }

    fn collect_file_integrity(
        &self,
        paths: &[String],
        expected: Option<&HashMap<String, String>>,
    ) -> EngineResult<Vec<FileIntegrityRecord>> {
        Ok(integrity::scan_files(paths, expected))
    }

    fn critical_file_paths(&self) -> Vec<String> {
        integrity::critical_files()
    }
}
