//! Baseline handlers - CRUD, activation and comparison

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiResult, AppState};
use crate::logic::baseline::{
    self, Baseline, BaselineSummary, Comparison, ComparisonReport,
};
use crate::logic::snapshot;

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBaselineParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub baseline_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub id: i64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Capture a fresh snapshot, persist it as a new baseline and make it the
/// active one.
pub async fn create(
    State(state): State<AppState>,
    Query(params): Query<CreateBaselineParams>,
) -> ApiResult<Json<Baseline>> {
    let snapshot = snapshot::capture(state.scanner.clone()).await;
    let baseline = state
        .store
        .create(&params.name, &params.description, snapshot)?;
    Ok(Json(baseline))
}

/// The active baseline, or `null` when none is active
pub async fn active(State(state): State<AppState>) -> ApiResult<Json<Option<Baseline>>> {
    Ok(Json(state.store.get_active()?))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<BaselineSummary>>> {
    Ok(Json(state.store.list()?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Baseline>> {
    Ok(Json(state.store.get(id)?))
}

pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ActionResponse>> {
    state.store.set_active(id)?;
    Ok(Json(ActionResponse { success: true, id }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ActionResponse>> {
    state.store.delete(id)?;
    Ok(Json(ActionResponse { success: true, id }))
}

/// Compare live state against a baseline: the one given by id, or the
/// active one when unspecified.
pub async fn compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> ApiResult<Json<ComparisonReport>> {
    let current = snapshot::capture(state.scanner.clone()).await;
    let report = baseline::compare(&state.store, &current, params.baseline_id)?;
    Ok(Json(report))
}

/// Recorded comparison history for one baseline
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Comparison>>> {
    // Distinguish an unknown baseline from one with no history yet
    state.store.get(id)?;
    Ok(Json(state.store.list_comparisons(id)?))
}
