//! Baseline Store
//!
//! Durable, versioned collection of named baselines plus an append-only
//! comparison history, backed by SQLite. The store is an explicit handle
//! passed to each call site; constructing it in-memory gives tests an
//! isolated instance.
//!
//! Every multi-step mutation runs inside an IMMEDIATE transaction: commit
//! or full rollback, never a partially visible write. This is the single
//! serialization point that upholds the at-most-one-active invariant under
//! concurrent callers.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::logic::baseline::types::{Baseline, BaselineSummary, Comparison, Diff};
use crate::logic::error::{EngineError, EngineResult};
use crate::logic::snapshot::Snapshot;

// ============================================================================
// SCHEMA
// ============================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS baselines (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,
    description    TEXT NOT NULL DEFAULT '',
    created_at     INTEGER NOT NULL,
    is_active      INTEGER NOT NULL DEFAULT 0,
    processes      TEXT NOT NULL,
    ports          TEXT NOT NULL,
    startup_items  TEXT NOT NULL,
    file_integrity TEXT NOT NULL,
    metrics        TEXT NOT NULL,
    warnings       TEXT NOT NULL DEFAULT '[]',
    captured_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS baseline_comparisons (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    baseline_id INTEGER NOT NULL,
    compared_at INTEGER NOT NULL,
    differences TEXT NOT NULL,
    risk_score  REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comparisons_baseline
    ON baseline_comparisons(baseline_id, compared_at);
"#;

const BASELINE_COLUMNS: &str = "id, name, description, created_at, is_active, \
     processes, ports, startup_items, file_integrity, metrics, warnings, captured_at";

// ============================================================================
// STORE
// ============================================================================

pub struct BaselineStore {
    conn: Mutex<Connection>,
}

impl BaselineStore {
    /// Open (or create) the store at the given path and run migrations
    pub fn open(path: &Path) -> EngineResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        Ok(BaselineStore {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for isolated tests
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(BaselineStore {
            conn: Mutex::new(conn),
        })
    }

    // ------------------------------------------------------------------
    // MUTATIONS
    // ------------------------------------------------------------------

    /// Persist a freshly captured snapshot as a new baseline and atomically
    /// make it the only active one.
    pub fn create(
        &self,
        name: &str,
        description: &str,
        snapshot: Snapshot,
    ) -> EngineResult<Baseline> {
        let processes = serde_json::to_string(&snapshot.processes)?;
        let ports = serde_json::to_string(&snapshot.ports)?;
        let startup_items = serde_json::to_string(&snapshot.startup_items)?;
        let file_integrity = serde_json::to_string(&snapshot.file_integrity)?;
        let metrics = serde_json::to_string(&snapshot.metrics)?;
        let warnings = serde_json::to_string(&snapshot.warnings)?;

        let created_at = now_secs();

        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO baselines \
             (name, description, created_at, is_active, processes, ports, \
              startup_items, file_integrity, metrics, warnings, captured_at) \
             VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                name,
                description,
                created_at.timestamp(),
                processes,
                ports,
                startup_items,
                file_integrity,
                metrics,
                warnings,
                snapshot.captured_at.timestamp(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE baselines SET is_active = 0 WHERE id != ?1",
            params![id],
        )?;
        tx.commit()?;

        log::info!("Created baseline '{}' (id {}), now active", name, id);

        Ok(Baseline {
            id,
            name: name.to_string(),
            description: description.to_string(),
            created_at,
            is_active: true,
            snapshot,
        })
    }

    /// Activate one baseline, deactivating every other, in one transaction
    pub fn set_active(&self, id: i64) -> EngineResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM baselines WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(EngineError::NotFound(id));
        }

        tx.execute("UPDATE baselines SET is_active = 0", [])?;
        tx.execute(
            "UPDATE baselines SET is_active = 1 WHERE id = ?1",
            params![id],
        )?;
        tx.commit()?;

        log::info!("Baseline {} is now active", id);
        Ok(())
    }

    /// Delete a baseline and, first, every comparison that references it.
    /// Deleting the active baseline leaves the store with no active one.
    pub fn delete(&self, id: i64) -> EngineResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let comparisons = tx.execute(
            "DELETE FROM baseline_comparisons WHERE baseline_id = ?1",
            params![id],
        )?;
        let deleted = tx.execute("DELETE FROM baselines WHERE id = ?1", params![id])?;
        if deleted == 0 {
            // Transaction drop rolls the cascade back
            return Err(EngineError::NotFound(id));
        }
        tx.commit()?;

        log::info!(
            "Deleted baseline {} ({} recorded comparisons cascaded)",
            id,
            comparisons
        );
        Ok(())
    }

    /// Append an immutable comparison row. Existing rows are never updated.
    pub fn record_comparison(
        &self,
        baseline_id: i64,
        differences: &Diff,
        risk_score: f64,
    ) -> EngineResult<Comparison> {
        let compared_at = now_secs();
        let diff_json = serde_json::to_string(differences)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO baseline_comparisons (baseline_id, compared_at, differences, risk_score) \
             VALUES (?1, ?2, ?3, ?4)",
            params![baseline_id, compared_at.timestamp(), diff_json, risk_score],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Comparison {
            id,
            baseline_id,
            compared_at,
            differences: differences.clone(),
            risk_score,
        })
    }

    // ------------------------------------------------------------------
    // READS
    // ------------------------------------------------------------------

    /// The active baseline, if any. Multiple active rows should be
    /// impossible; if ever observed, the most recently created wins and the
    /// fault is logged loudly.
    pub fn get_active(&self) -> EngineResult<Option<Baseline>> {
        let conn = self.conn.lock();

        let active_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM baselines WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        if active_count > 1 {
            log::error!(
                "{}",
                EngineError::InvariantViolation(format!(
                    "{} baselines marked active at once",
                    active_count
                ))
            );
        }

        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM baselines WHERE is_active = 1 \
                     ORDER BY created_at DESC, id DESC LIMIT 1",
                    BASELINE_COLUMNS
                ),
                [],
                BaselineRow::from_row,
            )
            .optional()?;

        row.map(BaselineRow::into_baseline).transpose()
    }

    /// Fetch one baseline with its full snapshot
    pub fn get(&self, id: i64) -> EngineResult<Baseline> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                &format!("SELECT {} FROM baselines WHERE id = ?1", BASELINE_COLUMNS),
                params![id],
                BaselineRow::from_row,
            )
            .optional()?;

        row.ok_or(EngineError::NotFound(id))?.into_baseline()
    }

    /// List metadata and metrics for every baseline, newest first.
    /// Never embeds the record lists.
    pub fn list(&self) -> EngineResult<Vec<BaselineSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at, is_active, metrics \
             FROM baselines ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, description, created_at, is_active, metrics) = row?;
            summaries.push(BaselineSummary {
                id,
                name,
                description,
                created_at: ts_to_datetime(created_at),
                is_active,
                metrics: serde_json::from_str(&metrics)?,
            });
        }
        Ok(summaries)
    }

    /// Recorded comparisons for one baseline, newest first
    pub fn list_comparisons(&self, baseline_id: i64) -> EngineResult<Vec<Comparison>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, baseline_id, compared_at, differences, risk_score \
             FROM baseline_comparisons WHERE baseline_id = ?1 \
             ORDER BY compared_at DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![baseline_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
            ))
        })?;

        let mut comparisons = Vec::new();
        for row in rows {
            let (id, baseline_id, compared_at, differences, risk_score) = row?;
            comparisons.push(Comparison {
                id,
                baseline_id,
                compared_at: ts_to_datetime(compared_at),
                differences: serde_json::from_str(&differences)?,
                risk_score,
            });
        }
        Ok(comparisons)
    }

    /// Number of baselines currently flagged active. Always 0 or 1 under
    /// correct transactional discipline.
    pub fn count_active(&self) -> EngineResult<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM baselines WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

struct BaselineRow {
    id: i64,
    name: String,
    description: String,
    created_at: i64,
    is_active: bool,
    processes: String,
    ports: String,
    startup_items: String,
    file_integrity: String,
    metrics: String,
    warnings: String,
    captured_at: i64,
}

impl BaselineRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(BaselineRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
            is_active: row.get(4)?,
            processes: row.get(5)?,
            ports: row.get(6)?,
            startup_items: row.get(7)?,
            file_integrity: row.get(8)?,
            metrics: row.get(9)?,
            warnings: row.get(10)?,
            captured_at: row.get(11)?,
        })
    }

    fn into_baseline(self) -> EngineResult<Baseline> {
        Ok(Baseline {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: ts_to_datetime(self.created_at),
            is_active: self.is_active,
            snapshot: Snapshot {
                processes: serde_json::from_str(&self.processes)?,
                ports: serde_json::from_str(&self.ports)?,
                startup_items: serde_json::from_str(&self.startup_items)?,
                file_integrity: serde_json::from_str(&self.file_integrity)?,
                metrics: serde_json::from_str(&self.metrics)?,
                warnings: serde_json::from_str(&self.warnings)?,
                captured_at: ts_to_datetime(self.captured_at),
            },
        })
    }
}

// ============================================================================
// TIME HELPERS
// ============================================================================

/// Now, truncated to whole seconds so values round-trip through the store
fn now_secs() -> DateTime<Utc> {
    ts_to_datetime(Utc::now().timestamp())
}

fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}
