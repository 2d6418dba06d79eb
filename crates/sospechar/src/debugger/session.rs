//! Statistical Debugging Session
//!
//! [`StatisticalDebugger`] spans a whole fault-localization session: it owns
//! the [`CoverageTable`] and every committed [`Trace`]. Per-run machinery
//! (tracer, collector) is created and destroyed around each run; the session
//! outlives them all.
//!
//! The table is mutated only between runs, by `add_trace` — the single-writer
//! discipline the engine is built on.

use super::difference::LocationCounts;
use super::table::{CoverageTable, RunId};
use crate::collector::{CoverageCollector, Outcome, Trace};
use crate::location::Location;
use crate::result::SospecharResult;
use crate::tracer::{EventTracer, ProbeHandle, RunStatus};
use std::panic::resume_unwind;
use tracing::debug;

/// Session-wide owner of the coverage table and committed runs
#[derive(Debug, Default)]
pub struct StatisticalDebugger {
    table: CoverageTable,
    traces: Vec<(RunId, Trace)>,
    next_run: u32,
}

impl StatisticalDebugger {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a finalized trace under a freshly allocated run id
    pub fn add_trace(&mut self, trace: Trace) -> RunId {
        let mut id = RunId::new(self.next_run);
        while self.table.is_committed(id) {
            self.next_run += 1;
            id = RunId::new(self.next_run);
        }
        self.next_run += 1;
        self.add_trace_with_id(id, trace)
            .expect("freshly allocated run id cannot collide")
    }

    /// Commit a finalized trace under a caller-supplied run id
    ///
    /// Fails with [`SospecharError::DuplicateRun`](crate::SospecharError::DuplicateRun)
    /// if the id was already committed; the table and trace list are left
    /// unchanged.
    pub fn add_trace_with_id(&mut self, id: RunId, trace: Trace) -> SospecharResult<RunId> {
        self.table.append_run(id, trace.hits())?;
        debug!(
            run = id.as_u32(),
            outcome = %trace.outcome(),
            locations = trace.hits().len(),
            "committed run"
        );
        self.traces.push((id, trace));
        Ok(id)
    }

    /// Trace one execution of `target`, judge it, and commit it — in one call
    ///
    /// `judge` maps the target's return value to an [`Outcome`]; the core
    /// never decides correctness itself. If the target panics, the run is
    /// committed as `Outcome::Fail` with the exception attached, and the
    /// panic then resumes unwinding to the caller.
    pub fn observe<T, F, J>(&mut self, target: F, judge: J) -> SospecharResult<(RunId, T)>
    where
        F: FnOnce(&mut ProbeHandle<'_, CoverageCollector>) -> T,
        J: FnOnce(&T) -> Outcome,
    {
        let tracer = EventTracer::new(CoverageCollector::new());
        match tracer.run(target) {
            RunStatus::Completed(run) => {
                let outcome = judge(run.value());
                let (trace, value) = run.finish(outcome)?;
                let id = self.add_trace(trace);
                Ok((id, value))
            }
            RunStatus::Panicked { trace, payload } => {
                let _ = self.add_trace(trace);
                resume_unwind(payload)
            }
        }
    }

    /// The session's coverage table
    #[must_use]
    pub const fn table(&self) -> &CoverageTable {
        &self.table
    }

    /// All known locations, in first-seen order; restartable
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.table.locations()
    }

    /// Committed runs in commit order
    pub fn runs(&self) -> impl Iterator<Item = (RunId, &Trace)> {
        self.traces.iter().map(|(id, trace)| (*id, trace))
    }

    /// The trace committed under the given run id
    #[must_use]
    pub fn trace(&self, id: RunId) -> Option<&Trace> {
        self.traces
            .iter()
            .find(|(committed, _)| *committed == id)
            .map(|(_, trace)| trace)
    }

    /// Number of committed runs
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.traces.len()
    }

    /// Per-outcome hit counts of one location across the session
    ///
    /// A "hit" counts runs that touched the location, not individual events.
    /// Unresolved runs contribute to neither side.
    #[must_use]
    pub fn counts_for(&self, location: &Location) -> LocationCounts {
        let mut counts = LocationCounts::default();
        for (_, trace) in &self.traces {
            match trace.outcome() {
                Outcome::Pass => {
                    counts.total_passed += 1;
                    if trace.covers(location) {
                        counts.passed_hits += 1;
                    }
                }
                Outcome::Fail => {
                    counts.total_failed += 1;
                    if trace.covers(location) {
                        counts.failed_hits += 1;
                    }
                }
                Outcome::Unresolved => {}
            }
        }
        counts
    }
}
