//! Spectrum-Based Suspiciousness
//!
//! A spectrum metric turns per-location pass/fail hit counts into a score in
//! `[0, 1]` estimating how likely the location is the fault's origin. The
//! metric is injected into a [`SpectrumDebugger`] session; the ranking and
//! rendering helpers are shared across metrics.
//!
//! A score of `None` means "no evidence" (the location was hit by no passing
//! or failing run). It is distinct from a score of 0 and is never an error.

mod discrete;
mod ochiai;
mod tarantula;

pub use discrete::{
    Bucket, BucketConfig, BucketConfigBuilder, DiscreteSpectrumDebugger, DEFAULT_BINS,
};
pub use ochiai::OchiaiMetric;
pub use tarantula::TarantulaMetric;

use crate::debugger::{DifferenceDebugger, LocationCounts};
use crate::location::Location;
use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};

/// A suspiciousness scoring formula over per-location hit counts
pub trait SuspiciousnessMetric {
    /// Name of the metric, for reports and logs
    fn name(&self) -> &'static str;

    /// Score the given counts; `None` when there is no evidence
    fn score(&self, counts: &LocationCounts) -> Option<f64>;
}

/// A fault-localization session scored by an injected metric
///
/// Composes a [`DifferenceDebugger`] (and thereby the whole session) with a
/// [`SuspiciousnessMetric`]; derefs to the debugger underneath.
#[derive(Debug, Default)]
pub struct SpectrumDebugger<M: SuspiciousnessMetric> {
    debugger: DifferenceDebugger,
    metric: M,
}

/// Session scored with the Tarantula metric
pub type TarantulaDebugger = SpectrumDebugger<TarantulaMetric>;

/// Session scored with the Ochiai metric
pub type OchiaiDebugger = SpectrumDebugger<OchiaiMetric>;

impl<M: SuspiciousnessMetric> SpectrumDebugger<M> {
    /// Create a session scored by the given metric
    #[must_use]
    pub fn new(metric: M) -> Self {
        Self {
            debugger: DifferenceDebugger::new(),
            metric,
        }
    }

    /// Score an existing session with the given metric
    #[must_use]
    pub const fn with_debugger(debugger: DifferenceDebugger, metric: M) -> Self {
        Self { debugger, metric }
    }

    /// The injected metric
    #[must_use]
    pub const fn metric(&self) -> &M {
        &self.metric
    }

    /// Suspiciousness of one location under the session's current table
    ///
    /// Pure: repeated calls without an intervening `add_trace` return
    /// identical results.
    #[must_use]
    pub fn suspiciousness(&self, location: &Location) -> Option<f64> {
        self.metric.score(&self.debugger.counts_for(location))
    }

    /// All locations with a defined score, most suspicious first
    ///
    /// Ties are broken by ascending location identity, so the ranking is
    /// deterministic across repeated calls.
    #[must_use]
    pub fn rank(&self) -> Vec<(Location, f64)> {
        let mut ranked: Vec<(Location, f64)> = self
            .debugger
            .locations()
            .filter_map(|location| {
                self.suspiciousness(location)
                    .map(|score| (location.clone(), score))
            })
            .collect();
        ranked.sort_by(|(loc_a, score_a), (loc_b, score_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(Ordering::Equal)
                .then_with(|| loc_a.cmp(loc_b))
        });
        ranked
    }

    /// Score rendered as a right-aligned percentage, e.g. `" 75%"`
    ///
    /// Blank (same width) when the location has no evidence.
    #[must_use]
    pub fn percentage(&self, location: &Location) -> String {
        match self.suspiciousness(location) {
            Some(score) => format!("{:>3}%", (score * 100.0) as u64),
            None => " ".repeat(4),
        }
    }

    /// Tooltip text for an external renderer; same as [`Self::percentage`]
    #[must_use]
    pub fn tooltip(&self, location: &Location) -> String {
        self.percentage(location)
    }
}

impl<M: SuspiciousnessMetric> Deref for SpectrumDebugger<M> {
    type Target = DifferenceDebugger;

    fn deref(&self) -> &Self::Target {
        &self.debugger
    }
}

impl<M: SuspiciousnessMetric> DerefMut for SpectrumDebugger<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.debugger
    }
}

impl TarantulaDebugger {
    /// Rendering hue for a location: 0 = suspicious red, 1 = innocent green
    ///
    /// `None` when the location has no evidence. The complement of the
    /// Tarantula score.
    #[must_use]
    pub fn hue(&self, location: &Location) -> Option<f64> {
        let counts = self.counts_for(location);
        let passed = counts.passed_fraction();
        let failed = counts.failed_fraction();
        if passed + failed > 0.0 {
            Some(passed / (passed + failed))
        } else {
            None
        }
    }

    /// Rendering brightness: how strongly the runs speak about the location
    ///
    /// The larger of the pass and fail fractions; 0 when no run touched it.
    #[must_use]
    pub fn brightness(&self, location: &Location) -> f64 {
        let counts = self.counts_for(location);
        counts.passed_fraction().max(counts.failed_fraction())
    }
}
