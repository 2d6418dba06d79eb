//! Tests for the cross-run aggregation layer.
//!
//! Each test states the falsifiable property it checks; run construction
//! goes through the real collector so the whole ingestion path is exercised.

use super::*;
use crate::collector::{Collector, CoverageCollector, Outcome, Trace};
use crate::location::Location;
use crate::result::SospecharError;
use crate::tracer::{EventKind, TraceEvent};
use std::collections::HashSet;

fn loc(function: &str, line: u32) -> Location {
    Location::new(function, line)
}

/// Build a trace touching the given locations once each
fn trace_of(locations: &[(&str, u32)], outcome: Outcome) -> Trace {
    let mut collector = CoverageCollector::new();
    for (sequence, (function, line)) in locations.iter().enumerate() {
        let event = TraceEvent::new(
            EventKind::Line,
            loc(function, *line),
            sequence as u64,
            Vec::new(),
            1,
        );
        collector.on_event(event).unwrap();
    }
    collector.finalize(outcome, None).unwrap()
}

mod table_tests {
    use super::*;

    /// Row count equals the size of the union of all traces' coverage sets
    #[test]
    fn test_rows_equal_coverage_union() {
        let mut session = StatisticalDebugger::new();
        let runs = [
            trace_of(&[("f", 1), ("f", 2)], Outcome::Pass),
            trace_of(&[("f", 2), ("g", 7)], Outcome::Fail),
            trace_of(&[("f", 1), ("g", 7), ("g", 8)], Outcome::Pass),
        ];
        let mut union = HashSet::new();
        for run in runs {
            union.extend(run.coverage().cloned().collect::<Vec<_>>());
            let _ = session.add_trace(run);
        }
        assert_eq!(session.table().row_count(), union.len());
        assert_eq!(
            session.locations().cloned().collect::<HashSet<_>>(),
            union
        );
    }

    /// Locations iterate in first-seen order and the iterator restarts
    #[test]
    fn test_locations_insertion_ordered_and_restartable() {
        let mut session = StatisticalDebugger::new();
        let _ = session.add_trace(trace_of(&[("b", 5), ("a", 1)], Outcome::Pass));
        let _ = session.add_trace(trace_of(&[("c", 9), ("a", 1)], Outcome::Fail));

        let expected = vec![loc("b", 5), loc("a", 1), loc("c", 9)];
        let first: Vec<_> = session.locations().cloned().collect();
        let second: Vec<_> = session.locations().cloned().collect();
        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }

    /// Per-run hit counts are queryable per table cell
    #[test]
    fn test_hit_counts_per_run() {
        let mut session = StatisticalDebugger::new();
        let id = session.add_trace(trace_of(&[("f", 1), ("f", 1), ("f", 2)], Outcome::Pass));
        assert_eq!(session.table().hits_for(&loc("f", 1), id), 2);
        assert_eq!(session.table().hits_for(&loc("f", 2), id), 1);
        assert_eq!(session.table().hits_for(&loc("f", 3), id), 0);
        assert!(session.table().covered_in(&loc("f", 1), id));
        assert!(!session.table().covered_in(&loc("f", 3), id));
    }
}

mod run_id_tests {
    use super::*;

    /// Re-adding a committed run id is rejected and the table is unchanged
    #[test]
    fn test_duplicate_run_rejected_table_unchanged() {
        let mut session = StatisticalDebugger::new();
        let id = session.add_trace(trace_of(&[("f", 1)], Outcome::Pass));

        let rows_before = session.table().row_count();
        let runs_before = session.run_count();

        let err = session
            .add_trace_with_id(id, trace_of(&[("g", 2)], Outcome::Fail))
            .unwrap_err();
        assert!(matches!(err, SospecharError::DuplicateRun { run_id } if run_id == id.as_u32()));

        assert_eq!(session.table().row_count(), rows_before);
        assert_eq!(session.run_count(), runs_before);
        assert!(session.locations().all(|l| l != &loc("g", 2)));
    }

    /// Fresh allocation skips ids committed manually
    #[test]
    fn test_allocation_skips_committed_ids() {
        let mut session = StatisticalDebugger::new();
        let manual = session
            .add_trace_with_id(RunId::new(0), trace_of(&[("f", 1)], Outcome::Pass))
            .unwrap();
        let fresh = session.add_trace(trace_of(&[("f", 2)], Outcome::Fail));
        assert_ne!(manual, fresh);
        assert_eq!(session.run_count(), 2);
    }

    /// Committed traces stay retrievable by run id
    #[test]
    fn test_trace_retrieval() {
        let mut session = StatisticalDebugger::new();
        let id = session.add_trace(trace_of(&[("f", 1)], Outcome::Unresolved));
        let trace = session.trace(id).unwrap();
        assert_eq!(trace.outcome(), Outcome::Unresolved);
        assert!(session.trace(RunId::new(999)).is_none());
    }
}

mod counts_tests {
    use super::*;

    /// counts_for counts runs, not events, split by outcome
    #[test]
    fn test_counts_split_by_outcome() {
        let mut session = StatisticalDebugger::new();
        // Location f:1 touched twice within one passing run: still one hit.
        let _ = session.add_trace(trace_of(&[("f", 1), ("f", 1)], Outcome::Pass));
        let _ = session.add_trace(trace_of(&[("f", 2)], Outcome::Pass));
        let _ = session.add_trace(trace_of(&[("f", 1)], Outcome::Fail));

        let counts = session.counts_for(&loc("f", 1));
        assert_eq!(counts.passed_hits, 1);
        assert_eq!(counts.total_passed, 2);
        assert_eq!(counts.failed_hits, 1);
        assert_eq!(counts.total_failed, 1);
    }

    /// Unresolved runs are excluded from both sides but remain retrievable
    #[test]
    fn test_unresolved_excluded_from_counts() {
        let mut session = StatisticalDebugger::new();
        let _ = session.add_trace(trace_of(&[("f", 1)], Outcome::Pass));
        let unresolved = session.add_trace(trace_of(&[("f", 1)], Outcome::Unresolved));

        let counts = session.counts_for(&loc("f", 1));
        assert_eq!(counts.total_passed, 1);
        assert_eq!(counts.total_failed, 0);
        assert_eq!(counts.passed_hits, 1);
        assert_eq!(counts.failed_hits, 0);

        // Still in the table and the trace list.
        assert!(session.trace(unresolved).is_some());
        assert!(session.table().covered_in(&loc("f", 1), unresolved));
    }

    #[test]
    fn test_fractions() {
        let counts = LocationCounts {
            passed_hits: 1,
            total_passed: 3,
            failed_hits: 2,
            total_failed: 2,
        };
        assert!((counts.passed_fraction() - 1.0 / 3.0).abs() < 1e-12);
        assert!((counts.failed_fraction() - 1.0).abs() < 1e-12);

        let empty = LocationCounts::default();
        assert_eq!(empty.passed_fraction(), 0.0);
        assert_eq!(empty.failed_fraction(), 0.0);
    }
}

mod difference_tests {
    use super::*;

    fn split_session() -> DifferenceDebugger {
        let mut debugger = DifferenceDebugger::new();
        let _ = debugger.add_trace(trace_of(&[("f", 1), ("f", 2)], Outcome::Pass));
        let _ = debugger.add_trace(trace_of(&[("f", 1), ("f", 3)], Outcome::Fail));
        let _ = debugger.add_trace(trace_of(&[("f", 4)], Outcome::Unresolved));
        debugger
    }

    /// passed()/failed() partition committed runs; unresolved is in neither
    #[test]
    fn test_outcome_partition() {
        let debugger = split_session();
        assert_eq!(debugger.passed().count(), 1);
        assert_eq!(debugger.failed().count(), 1);
        assert_eq!(debugger.run_count(), 3);
    }

    /// Set-style views derive from the split
    #[test]
    fn test_location_set_views() {
        let debugger = split_session();
        assert_eq!(
            debugger.all_pass_locations(),
            vec![loc("f", 1), loc("f", 2)]
        );
        assert_eq!(
            debugger.all_fail_locations(),
            vec![loc("f", 1), loc("f", 3)]
        );
        assert_eq!(debugger.only_fail_locations(), vec![loc("f", 3)]);
        assert_eq!(debugger.only_pass_locations(), vec![loc("f", 2)]);
    }
}

mod observe_tests {
    use super::*;
    use crate::locals;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    /// observe traces, judges, and commits in one call
    #[test]
    fn test_observe_commits_judged_run() {
        let mut session = StatisticalDebugger::new();
        let (id, value) = session
            .observe(
                |probe| {
                    let x = 2;
                    probe.call("middle", 1, locals![x]);
                    probe.line("middle", 2, locals![x]);
                    probe.ret("middle", 3, locals![x]);
                    x * 2
                },
                |result| {
                    if *result == 4 {
                        Outcome::Pass
                    } else {
                        Outcome::Fail
                    }
                },
            )
            .unwrap();

        assert_eq!(value, 4);
        let trace = session.trace(id).unwrap();
        assert_eq!(trace.outcome(), Outcome::Pass);
        assert_eq!(trace.id().as_deref(), Some("middle(x=2)"));
    }

    /// A panicking target is committed as FAIL and the panic resumes
    #[test]
    fn test_observe_commits_panicked_run_then_reraises() {
        let mut session = StatisticalDebugger::new();
        let raised = catch_unwind(AssertUnwindSafe(|| {
            let _ = session.observe(
                |probe| {
                    probe.call("f", 1, locals![]);
                    probe.line("f", 2, locals![]);
                    panic!("assertion violated");
                },
                |_: &()| Outcome::Pass,
            );
        }));
        assert!(raised.is_err());

        assert_eq!(session.run_count(), 1);
        let (_, trace) = session.runs().next().unwrap();
        assert_eq!(trace.outcome(), Outcome::Fail);
        assert_eq!(trace.exception().unwrap().message(), "assertion violated");
        assert!(trace.covers(&loc("f", 2)));
    }

    /// A new run may begin after the previous trace is committed —
    /// sessions are independent handles, not ambient globals
    #[test]
    fn test_independent_sessions_coexist() {
        let mut first = StatisticalDebugger::new();
        let mut second = StatisticalDebugger::new();
        let _ = first
            .observe(
                |probe| probe.line("f", 1, locals![]),
                |_: &()| Outcome::Pass,
            )
            .unwrap();
        let _ = second
            .observe(
                |probe| probe.line("g", 9, locals![]),
                |_: &()| Outcome::Fail,
            )
            .unwrap();

        assert_eq!(first.locations().cloned().collect::<Vec<_>>(), vec![loc("f", 1)]);
        assert_eq!(second.locations().cloned().collect::<Vec<_>>(), vec![loc("g", 9)]);
    }
}
