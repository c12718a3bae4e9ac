//! Risk Scorer
//!
//! Maps a diff onto a bounded numeric score and a discrete risk level.
//! Only *added* records contribute - the appearance of new state is what
//! matters; removals and unchanged records carry no weight. The sum is
//! intentionally unbounded before the cap so that many small new risks
//! still accumulate into a high verdict.

use crate::constants::{
    RISK_HIGH_THRESHOLD, RISK_LOW_THRESHOLD, RISK_MEDIUM_THRESHOLD, RISK_SCORE_CAP,
    SCORE_PORT_HIGH, SCORE_PORT_MEDIUM, SCORE_PROCESS_HIGH, SCORE_PROCESS_LOW,
    SCORE_PROCESS_MEDIUM, SCORE_STARTUP_HIGH, SCORE_STARTUP_MEDIUM,
};
use crate::logic::baseline::types::CategoryDiff;
use crate::logic::records::{PortRecord, ProcessRecord, RiskLevel, StartupRecord};

/// Score the added records of a diff. Returns `(score, level)` with the
/// score capped at 100.
pub fn score_added(
    processes: &CategoryDiff<ProcessRecord>,
    ports: &CategoryDiff<PortRecord>,
    startup_items: &CategoryDiff<StartupRecord>,
) -> (f64, RiskLevel) {
    let mut score = 0.0;

    for process in &processes.added {
        score += match process.risk_level {
            RiskLevel::High => SCORE_PROCESS_HIGH,
            RiskLevel::Medium => SCORE_PROCESS_MEDIUM,
            RiskLevel::Low => SCORE_PROCESS_LOW,
            RiskLevel::Safe => 0.0,
        };
    }

    for port in &ports.added {
        score += match port.risk_level {
            RiskLevel::High => SCORE_PORT_HIGH,
            RiskLevel::Medium => SCORE_PORT_MEDIUM,
            _ => 0.0,
        };
    }

    for item in &startup_items.added {
        score += match item.risk_level {
            RiskLevel::High => SCORE_STARTUP_HIGH,
            RiskLevel::Medium => SCORE_STARTUP_MEDIUM,
            _ => 0.0,
        };
    }

    let score = score.min(RISK_SCORE_CAP);
    (score, level_for(score))
}

/// Map a score onto its discrete risk level
pub fn level_for(score: f64) -> RiskLevel {
    if score >= RISK_HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= RISK_MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else if score >= RISK_LOW_THRESHOLD {
        RiskLevel::Low
    } else {
        RiskLevel::Safe
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn process(risk_level: RiskLevel) -> ProcessRecord {
        ProcessRecord {
            pid: 1,
            name: "p".to_string(),
            username: None,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            status: "Run".to_string(),
            create_time: 0,
            cmdline: vec![],
            risk_level,
        }
    }

    fn port(risk_level: RiskLevel) -> PortRecord {
        PortRecord {
            local_address: "0.0.0.0".to_string(),
            local_port: 1,
            remote_address: None,
            remote_port: None,
            status: "LISTEN".to_string(),
            protocol: "tcp".to_string(),
            process_name: None,
            pid: None,
            risk_level,
        }
    }

    fn startup(risk_level: RiskLevel) -> StartupRecord {
        StartupRecord {
            name: "s".to_string(),
            path: "/tmp/s".to_string(),
            location: "/etc".to_string(),
            enabled: true,
            publisher: None,
            risk_level,
        }
    }

    fn added<T>(records: Vec<T>) -> CategoryDiff<T> {
        CategoryDiff {
            added: records,
            removed: vec![],
            unchanged: 0,
        }
    }

    fn empty<T>() -> CategoryDiff<T> {
        added(vec![])
    }

    #[test]
    fn test_empty_diff_is_safe() {
        let (score, level) = score_added(&empty(), &empty(), &empty());
        assert_eq!(score, 0.0);
        assert_eq!(level, RiskLevel::Safe);
    }

    #[test]
    fn test_single_high_process_is_low_verdict() {
        // One new high-risk process scores exactly 20, below the medium cut
        let (score, level) = score_added(
            &added(vec![process(RiskLevel::High)]),
            &empty(),
            &empty(),
        );
        assert_eq!(score, 20.0);
        assert_eq!(level, RiskLevel::Low);
    }

    #[test]
    fn test_weights_accumulate_across_categories() {
        let (score, level) = score_added(
            &added(vec![process(RiskLevel::High), process(RiskLevel::Low)]),
            &added(vec![port(RiskLevel::Medium)]),
            &added(vec![startup(RiskLevel::High)]),
        );
        // 20 + 3 + 8 + 25
        assert_eq!(score, 56.0);
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn test_removed_records_do_not_contribute() {
        let diff = CategoryDiff {
            added: vec![],
            removed: vec![process(RiskLevel::High)],
            unchanged: 3,
        };
        let (score, _) = score_added(&diff, &empty(), &empty());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let many: Vec<_> = (0..20).map(|_| process(RiskLevel::High)).collect();
        let (score, level) = score_added(&added(many), &empty(), &empty());
        assert_eq!(score, 100.0);
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn test_adding_risk_never_decreases_score() {
        let mut records = Vec::new();
        let mut previous = 0.0;
        for _ in 0..12 {
            records.push(process(RiskLevel::High));
            let (score, _) = score_added(&added(records.clone()), &empty(), &empty());
            assert!(score >= previous);
            assert!(score <= 100.0);
            previous = score;
        }
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for(0.0), RiskLevel::Safe);
        assert_eq!(level_for(9.9), RiskLevel::Safe);
        assert_eq!(level_for(10.0), RiskLevel::Low);
        assert_eq!(level_for(39.9), RiskLevel::Low);
        assert_eq!(level_for(40.0), RiskLevel::Medium);
        assert_eq!(level_for(69.9), RiskLevel::Medium);
        assert_eq!(level_for(70.0), RiskLevel::High);
        assert_eq!(level_for(100.0), RiskLevel::High);
    }
}
