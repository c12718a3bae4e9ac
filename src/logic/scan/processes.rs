//! Process Collector
//!
//! Enumerates running processes via `sysinfo` and classifies each one at
//! collection time. Processes that disappear mid-scan simply drop out of
//! the refreshed table; there is no per-process error path.

use sysinfo::{System, Users};

use crate::logic::error::EngineResult;
use crate::logic::records::ProcessRecord;
use crate::logic::risk;

/// Scan all running processes
pub fn collect() -> EngineResult<Vec<ProcessRecord>> {
    let mut sys = System::new_all();
    sys.refresh_all();

    let users = Users::new_with_refreshed_list();
    let total_memory = sys.total_memory() as f64;

    let mut records = Vec::with_capacity(sys.processes().len());

    for (pid, process) in sys.processes() {
        let name = process.name().to_string();
        let cmdline: Vec<String> = process.cmd().to_vec();

        let username = process
            .user_id()
            .and_then(|uid| users.get_user_by_id(uid))
            .map(|u| u.name().to_string());

        let cpu_percent = process.cpu_usage();
        let memory_percent = if total_memory > 0.0 {
            (process.memory() as f64 / total_memory * 100.0) as f32
        } else {
            0.0
        };

        let risk_level =
            risk::classify_process(&name, &cmdline, cpu_percent, username.as_deref());

        records.push(ProcessRecord {
            pid: pid.as_u32(),
            name,
            username,
            cpu_percent,
            memory_percent,
            status: process.status().to_string(),
            create_time: process.start_time() as i64,
            cmdline,
            risk_level,
        });
    }

    log::debug!("Collected {} processes", records.len());
    Ok(records)
}
