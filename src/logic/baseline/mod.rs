//! Baseline Module - Baseline & Diff Engine
//!
//! # Architecture
//! - `types.rs`: `Baseline`, `Diff`, `Comparison` and friends
//! - `store.rs`: SQLite-backed store with the single-active invariant
//! - `diff.rs`: key-based reconciliation between snapshots
//! - `score.rs`: additive risk scoring over added records
//!
//! # Failure Strategy
//! Store mutations are transactional; a failure mid-operation leaves the
//! store exactly as it was before the call.

pub mod diff;
pub mod score;
pub mod store;
pub mod types;

use crate::logic::error::{EngineError, EngineResult};
use crate::logic::snapshot::Snapshot;

pub use store::BaselineStore;
pub use types::{
    Baseline, BaselineRef, BaselineSummary, CategoryDiff, Comparison, ComparisonReport, Diff,
    DiffSummary,
};

/// Compare the current snapshot against a stored baseline.
///
/// With an explicit id the referenced baseline is used (`NotFound` if it
/// does not exist); otherwise the active one (`NoBaseline` if none is).
/// The result is appended to the comparison history before returning.
pub fn compare(
    store: &BaselineStore,
    current: &Snapshot,
    baseline_id: Option<i64>,
) -> EngineResult<ComparisonReport> {
    let baseline = match baseline_id {
        Some(id) => store.get(id)?,
        None => store.get_active()?.ok_or(EngineError::NoBaseline)?,
    };

    let differences = diff::diff_snapshots(&baseline.snapshot, current);

    let comparison =
        store.record_comparison(baseline.id, &differences, differences.summary.risk_score)?;

    log::info!(
        "Compared against baseline '{}' (id {}): score {:.1} ({})",
        baseline.name,
        baseline.id,
        differences.summary.risk_score,
        differences.summary.risk_level
    );

    Ok(ComparisonReport {
        baseline: BaselineRef {
            id: baseline.id,
            name: baseline.name,
            created_at: baseline.created_at,
        },
        compared_at: comparison.compared_at,
        differences,
    })
}
