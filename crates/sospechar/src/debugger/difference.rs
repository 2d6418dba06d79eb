//! Difference Debugging
//!
//! [`DifferenceDebugger`] partitions a session's committed runs by outcome
//! and derives the per-location pass/fail hit counts the spectrum metrics
//! feed on. Unresolved runs are excluded from both sides of the split but
//! stay retrievable from the session.
//!
//! Built on [`StatisticalDebugger`] by composition: it owns the session and
//! derefs to it.

use super::session::StatisticalDebugger;
use super::table::RunId;
use crate::collector::{Outcome, Trace};
use crate::location::Location;
use std::ops::{Deref, DerefMut};

/// Per-location hit counts, split by run outcome
///
/// Hits count runs that touched the location, so
/// `passed_hits <= total_passed` and `failed_hits <= total_failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationCounts {
    /// Passing runs that touched the location
    pub passed_hits: u64,
    /// All passing runs in the session
    pub total_passed: u64,
    /// Failing runs that touched the location
    pub failed_hits: u64,
    /// All failing runs in the session
    pub total_failed: u64,
}

impl LocationCounts {
    /// Fraction of passing runs that touched the location (0 if none passed)
    #[must_use]
    pub fn passed_fraction(&self) -> f64 {
        if self.total_passed == 0 {
            0.0
        } else {
            self.passed_hits as f64 / self.total_passed as f64
        }
    }

    /// Fraction of failing runs that touched the location (0 if none failed)
    #[must_use]
    pub fn failed_fraction(&self) -> f64 {
        if self.total_failed == 0 {
            0.0
        } else {
            self.failed_hits as f64 / self.total_failed as f64
        }
    }
}

/// Outcome-partitioned view over a statistical debugging session
#[derive(Debug, Default)]
pub struct DifferenceDebugger {
    session: StatisticalDebugger,
}

impl DifferenceDebugger {
    /// Create a difference debugger over a fresh session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing session
    #[must_use]
    pub const fn from_session(session: StatisticalDebugger) -> Self {
        Self { session }
    }

    /// Recover the underlying session
    #[must_use]
    pub fn into_session(self) -> StatisticalDebugger {
        self.session
    }

    /// Committed passing runs, in commit order
    pub fn passed(&self) -> impl Iterator<Item = (RunId, &Trace)> {
        self.session
            .runs()
            .filter(|(_, trace)| trace.outcome() == Outcome::Pass)
    }

    /// Committed failing runs, in commit order
    pub fn failed(&self) -> impl Iterator<Item = (RunId, &Trace)> {
        self.session
            .runs()
            .filter(|(_, trace)| trace.outcome() == Outcome::Fail)
    }

    /// Locations touched by at least one passing run, in table order
    #[must_use]
    pub fn all_pass_locations(&self) -> Vec<Location> {
        self.locations_where(|counts| counts.passed_hits > 0)
    }

    /// Locations touched by at least one failing run, in table order
    #[must_use]
    pub fn all_fail_locations(&self) -> Vec<Location> {
        self.locations_where(|counts| counts.failed_hits > 0)
    }

    /// Locations touched only by failing runs — the prime suspects
    #[must_use]
    pub fn only_fail_locations(&self) -> Vec<Location> {
        self.locations_where(|counts| counts.failed_hits > 0 && counts.passed_hits == 0)
    }

    /// Locations touched only by passing runs
    #[must_use]
    pub fn only_pass_locations(&self) -> Vec<Location> {
        self.locations_where(|counts| counts.passed_hits > 0 && counts.failed_hits == 0)
    }

    fn locations_where(&self, keep: impl Fn(&LocationCounts) -> bool) -> Vec<Location> {
        self.session
            .locations()
            .filter(|location| keep(&self.session.counts_for(location)))
            .cloned()
            .collect()
    }
}

impl Deref for DifferenceDebugger {
    type Target = StatisticalDebugger;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for DifferenceDebugger {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}
