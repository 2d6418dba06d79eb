//! Coverage Table
//!
//! The cross-run aggregation table: one row per location ever seen (in
//! first-seen order), one column per committed run. Append-only; committing
//! an already-used run id is rejected and leaves the table untouched.

use crate::location::Location;
use crate::result::{SospecharError, SospecharResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type-safe run identifier
///
/// One column of the coverage table. Cannot be confused with a line number
/// or an event sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(u32);

impl RunId {
    /// Create a new run ID
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Location → run → hit count aggregation across a session
#[derive(Debug, Default)]
pub struct CoverageTable {
    order: Vec<Location>,
    rows: HashMap<Location, HashMap<RunId, u64>>,
    runs: Vec<RunId>,
}

impl CoverageTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one run's per-location hit counts under the given run id
    ///
    /// Fails with [`SospecharError::DuplicateRun`] if the id is already
    /// committed; the table is left unchanged in that case.
    pub fn append_run(
        &mut self,
        run: RunId,
        hits: &[(Location, u64)],
    ) -> SospecharResult<()> {
        if self.is_committed(run) {
            return Err(SospecharError::DuplicateRun {
                run_id: run.as_u32(),
            });
        }
        self.runs.push(run);

        for (location, count) in hits {
            if !self.rows.contains_key(location) {
                self.order.push(location.clone());
            }
            let row = self.rows.entry(location.clone()).or_default();
            let _ = row.insert(run, *count);
        }
        Ok(())
    }

    /// Whether the given run id is already committed
    #[must_use]
    pub fn is_committed(&self, run: RunId) -> bool {
        self.runs.contains(&run)
    }

    /// Committed run ids in commit order
    #[must_use]
    pub fn runs(&self) -> &[RunId] {
        &self.runs
    }

    /// All known locations, in first-seen order
    ///
    /// Restartable: each call yields a fresh iterator over the same
    /// insertion-ordered sequence.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.order.iter()
    }

    /// Number of rows (distinct locations ever seen)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    /// Hit count of `location` in `run` (0 if untouched or unknown)
    #[must_use]
    pub fn hits_for(&self, location: &Location, run: RunId) -> u64 {
        self.rows
            .get(location)
            .and_then(|row| row.get(&run))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `location` was touched by `run`
    #[must_use]
    pub fn covered_in(&self, location: &Location, run: RunId) -> bool {
        self.hits_for(location, run) > 0
    }
}
