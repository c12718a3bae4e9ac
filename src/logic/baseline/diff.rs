//! Diff Engine
//!
//! Key-based reconciliation between two snapshots. Each category declares
//! an identity key: process name, local port number, startup item name.
//! File integrity is checked per fixed path rather than set-reconciled,
//! so it does not appear here.
//!
//! Records sharing an identity key on one side are not deduplicated:
//! every record whose key is missing on the other side is reported, so two
//! same-named processes that both appear yield two additions.

use std::collections::HashSet;
use std::hash::Hash;

use crate::logic::baseline::score;
use crate::logic::baseline::types::{CategoryDiff, Diff, DiffSummary};
use crate::logic::snapshot::Snapshot;

/// Reconcile a baseline snapshot against the current one
pub fn diff_snapshots(baseline: &Snapshot, current: &Snapshot) -> Diff {
    let processes = diff_category(&baseline.processes, &current.processes, |p| p.name.clone());
    let ports = diff_category(&baseline.ports, &current.ports, |p| p.local_port);
    let startup_items = diff_category(&baseline.startup_items, &current.startup_items, |s| {
        s.name.clone()
    });

    let (risk_score, risk_level) = score::score_added(&processes, &ports, &startup_items);

    let summary = DiffSummary {
        new_processes: processes.added.len(),
        removed_processes: processes.removed.len(),
        new_ports: ports.added.len(),
        closed_ports: ports.removed.len(),
        new_startup: startup_items.added.len(),
        removed_startup: startup_items.removed.len(),
        risk_score,
        risk_level,
    };

    Diff {
        processes,
        ports,
        startup_items,
        summary,
    }
}

/// Reconcile one category by identity key
fn diff_category<T, K, F>(baseline: &[T], current: &[T], key: F) -> CategoryDiff<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let baseline_keys: HashSet<K> = baseline.iter().map(&key).collect();
    let current_keys: HashSet<K> = current.iter().map(&key).collect();

    let mut added = Vec::new();
    for record in current {
        if !baseline_keys.contains(&key(record)) {
            added.push(record.clone());
        }
    }

    let mut removed = Vec::new();
    for record in baseline {
        if !current_keys.contains(&key(record)) {
            removed.push(record.clone());
        }
    }

    let unchanged = baseline_keys.intersection(&current_keys).count();

    CategoryDiff {
        added,
        removed,
        unchanged,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::records::RiskLevel;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        key: &'static str,
        risk: RiskLevel,
    }

    fn item(key: &'static str) -> Item {
        Item {
            key,
            risk: RiskLevel::Safe,
        }
    }

    #[test]
    fn test_diff_partitions_by_key() {
        let baseline = vec![item("chrome"), item("sshd"), item("cron")];
        let current = vec![item("chrome"), item("cron"), item("miner")];

        let diff = diff_category(&baseline, &current, |i| i.key);

        assert_eq!(diff.added, vec![item("miner")]);
        assert_eq!(diff.removed, vec![item("sshd")]);
        assert_eq!(diff.unchanged, 2);
    }

    #[test]
    fn test_identical_sides_yield_empty_diff() {
        let records = vec![item("a"), item("b")];
        let diff = diff_category(&records, &records, |i| i.key);

        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, 2);
    }

    #[test]
    fn test_empty_baseline_reports_everything_added() {
        let current = vec![item("a"), item("b")];
        let diff = diff_category(&[], &current, |i| i.key);

        assert_eq!(diff.added.len(), 2);
        assert!(diff.removed.is_empty());
        assert_eq!(diff.unchanged, 0);
    }

    #[test]
    fn test_duplicate_keys_are_not_deduplicated() {
        // Two same-named records only on the current side: both reported
        let baseline = vec![item("sshd")];
        let current = vec![item("sshd"), item("worker"), item("worker")];

        let diff = diff_category(&baseline, &current, |i| i.key);

        assert_eq!(diff.added.len(), 2);
        assert!(diff.removed.is_empty());
        assert_eq!(diff.unchanged, 1);
    }

    #[test]
    fn test_duplicate_shared_key_counts_once_as_unchanged() {
        // A key present on both sides is unchanged even when duplicated
        let baseline = vec![item("sshd"), item("sshd")];
        let current = vec![item("sshd")];

        let diff = diff_category(&baseline, &current, |i| i.key);

        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, 1);
    }
}
