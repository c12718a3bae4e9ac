//! Scan handlers - stateless reads over the collectors

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::api::{ApiError, ApiResult, AppState};
use crate::constants;
use crate::logic::alerts::{self, Alert};
use crate::logic::error::EngineResult;
use crate::logic::metrics::Metrics;
use crate::logic::records::{
    FileIntegrityRecord, PortRecord, ProcessRecord, StartupRecord,
};
use crate::logic::scan::integrity;
use crate::logic::snapshot::{self, CollectionWarning};

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SystemInfoResponse {
    pub os: String,
    pub os_version: String,
    pub architecture: String,
    pub hostname: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessListResponse {
    pub processes: Vec<ProcessRecord>,
    pub count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct PortListResponse {
    pub ports: Vec<PortRecord>,
    pub count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct StartupListResponse {
    pub startup_items: Vec<StartupRecord>,
    pub count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct IntegrityListResponse {
    pub file_integrity: Vec<FileIntegrityRecord>,
    pub count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<Alert>,
    pub count: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct QuickScanResponse {
    pub processes: Vec<ProcessRecord>,
    pub ports: Vec<PortRecord>,
    pub scan_type: &'static str,
    pub scan_duration: u64,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct FullScanResponse {
    pub processes: Vec<ProcessRecord>,
    pub ports: Vec<PortRecord>,
    pub startup_items: Vec<StartupRecord>,
    pub file_integrity: Vec<FileIntegrityRecord>,
    pub alerts: Vec<Alert>,
    pub metrics: Metrics,
    pub warnings: Vec<CollectionWarning>,
    pub scan_type: &'static str,
    pub scan_duration: u64,
    pub timestamp: i64,
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn system_info() -> Json<SystemInfoResponse> {
    Json(SystemInfoResponse {
        os: sysinfo::System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
        os_version: sysinfo::System::os_version().unwrap_or_default(),
        architecture: std::env::consts::ARCH.to_string(),
        hostname: hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_default(),
        version: constants::APP_VERSION.to_string(),
    })
}

pub async fn processes(State(state): State<AppState>) -> ApiResult<Json<ProcessListResponse>> {
    let scanner = state.scanner.clone();
    let records = run_blocking(move || scanner.collect_processes()).await?;

    Ok(Json(ProcessListResponse {
        count: records.len(),
        processes: records,
        timestamp: Utc::now().timestamp(),
    }))
}

pub async fn ports(State(state): State<AppState>) -> ApiResult<Json<PortListResponse>> {
    let scanner = state.scanner.clone();
    let records = run_blocking(move || scanner.collect_ports()).await?;

    Ok(Json(PortListResponse {
        count: records.len(),
        ports: records,
        timestamp: Utc::now().timestamp(),
    }))
}

pub async fn startup(State(state): State<AppState>) -> ApiResult<Json<StartupListResponse>> {
    let scanner = state.scanner.clone();
    let records = run_blocking(move || scanner.collect_startup_items()).await?;

    Ok(Json(StartupListResponse {
        count: records.len(),
        startup_items: records,
        timestamp: Utc::now().timestamp(),
    }))
}

/// Integrity scan. When a baseline is active, current hashes are checked
/// against the ones it recorded, so tampering shows up as `modified`.
pub async fn integrity(State(state): State<AppState>) -> ApiResult<Json<IntegrityListResponse>> {
    let scanner = state.scanner.clone();
    let records = run_blocking(move || {
        let paths = scanner.critical_file_paths();
        scanner.collect_file_integrity(&paths, None)
    })
    .await?;

    let records = match state.store.get_active()? {
        Some(active) => integrity::verify_against(&active.snapshot.file_integrity, records),
        None => records,
    };

    Ok(Json(IntegrityListResponse {
        count: records.len(),
        file_integrity: records,
        timestamp: Utc::now().timestamp(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<Json<Metrics>> {
    let snapshot = verified_snapshot(&state).await?;
    let metrics = crate::logic::metrics::aggregate(
        &snapshot.processes,
        &snapshot.ports,
        &snapshot.startup_items,
        &snapshot.file_integrity,
        snapshot.captured_at.timestamp(),
    );
    Ok(Json(metrics))
}

pub async fn alerts(State(state): State<AppState>) -> ApiResult<Json<AlertListResponse>> {
    let snapshot = verified_snapshot(&state).await?;
    let alerts = alerts::generate(
        &snapshot.processes,
        &snapshot.ports,
        &snapshot.startup_items,
        &snapshot.file_integrity,
    );

    Ok(Json(AlertListResponse {
        count: alerts.len(),
        alerts,
        timestamp: Utc::now().timestamp(),
    }))
}

/// Quick scan: processes + ports only
pub async fn quick_scan(State(state): State<AppState>) -> ApiResult<Json<QuickScanResponse>> {
    let started = std::time::Instant::now();

    let proc_scanner = state.scanner.clone();
    let port_scanner = state.scanner.clone();
    let (processes, ports) = tokio::join!(
        run_blocking(move || proc_scanner.collect_processes()),
        run_blocking(move || port_scanner.collect_ports()),
    );

    Ok(Json(QuickScanResponse {
        processes: processes?,
        ports: ports?,
        scan_type: "quick",
        scan_duration: started.elapsed().as_millis() as u64,
        timestamp: Utc::now().timestamp(),
    }))
}

/// Full scan: all four categories plus alerts and metrics
pub async fn full_scan(State(state): State<AppState>) -> ApiResult<Json<FullScanResponse>> {
    let started = std::time::Instant::now();

    let snapshot = verified_snapshot(&state).await?;
    let alerts = alerts::generate(
        &snapshot.processes,
        &snapshot.ports,
        &snapshot.startup_items,
        &snapshot.file_integrity,
    );
    let metrics = crate::logic::metrics::aggregate(
        &snapshot.processes,
        &snapshot.ports,
        &snapshot.startup_items,
        &snapshot.file_integrity,
        snapshot.captured_at.timestamp(),
    );

    Ok(Json(FullScanResponse {
        processes: snapshot.processes,
        ports: snapshot.ports,
        startup_items: snapshot.startup_items,
        file_integrity: snapshot.file_integrity,
        alerts,
        metrics,
        warnings: snapshot.warnings,
        scan_type: "full",
        scan_duration: started.elapsed().as_millis() as u64,
        timestamp: Utc::now().timestamp(),
    }))
}

// ============================================================================
// HELPERS
// ============================================================================

/// Capture a snapshot and, when a baseline is active, re-check file hashes
/// against the ones it recorded.
async fn verified_snapshot(state: &AppState) -> ApiResult<crate::logic::snapshot::Snapshot> {
    let mut snapshot = snapshot::capture(state.scanner.clone()).await;

    if let Some(active) = state.store.get_active()? {
        snapshot.file_integrity =
            integrity::verify_against(&active.snapshot.file_integrity, snapshot.file_integrity);
    }

    Ok(snapshot)
}

/// Run a collector on the blocking pool and fold both failure layers into
/// the API error space.
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> EngineResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("scan task failed: {}", e)))?
        .map_err(ApiError::from)
}
