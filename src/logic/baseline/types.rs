//! Baseline & Comparison Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::metrics::Metrics;
use crate::logic::records::{PortRecord, ProcessRecord, RiskLevel, StartupRecord};
use crate::logic::snapshot::Snapshot;

// ============================================================================
// BASELINE
// ============================================================================

/// A named, persisted snapshot used as the reference point for comparison.
/// Owned exclusively by the store; at most one baseline is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Listing view: metadata and metrics only, never the full record lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub metrics: Metrics,
}

// ============================================================================
// DIFF
// ============================================================================

/// Reconciliation result for one category. `unchanged` is a count only,
/// to avoid duplicating untouched payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDiff<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
    pub unchanged: usize,
}

impl<T> CategoryDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Per-category reconciliation between a baseline and the live state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diff {
    pub processes: CategoryDiff<ProcessRecord>,
    pub ports: CategoryDiff<PortRecord>,
    pub startup_items: CategoryDiff<StartupRecord>,
    pub summary: DiffSummary,
}

/// Counts plus the final verdict for a diff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSummary {
    pub new_processes: usize,
    pub removed_processes: usize,
    pub new_ports: usize,
    pub closed_ports: usize,
    pub new_startup: usize,
    pub removed_startup: usize,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

// ============================================================================
// COMPARISON HISTORY
// ============================================================================

/// One persisted comparison. Append-only audit row; `baseline_id` is a
/// lookup key, removed together with its baseline on cascade delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub id: i64,
    pub baseline_id: i64,
    pub compared_at: DateTime<Utc>,
    pub differences: Diff,
    pub risk_score: f64,
}

/// Reference to the baseline a comparison was made against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineRef {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Result returned to callers of the compare operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub baseline: BaselineRef,
    pub compared_at: DateTime<Utc>,
    pub differences: Diff,
}
