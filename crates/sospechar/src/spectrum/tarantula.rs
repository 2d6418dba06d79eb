//! Tarantula Metric
//!
//! Jones & Harrold's Tarantula formula. With p the fraction of passing runs
//! touching a location and f the fraction of failing runs touching it:
//!
//! ```text
//! score = f / (f + p)        if f + p > 0
//!       = undefined          otherwise
//! ```
//!
//! 1.0 means "touched by every failing run and no passing run".

use super::SuspiciousnessMetric;
use crate::debugger::LocationCounts;

/// The Tarantula suspiciousness formula
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TarantulaMetric;

impl TarantulaMetric {
    /// Create the metric
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SuspiciousnessMetric for TarantulaMetric {
    fn name(&self) -> &'static str {
        "tarantula"
    }

    fn score(&self, counts: &LocationCounts) -> Option<f64> {
        let passed = counts.passed_fraction();
        let failed = counts.failed_fraction();
        if passed + failed > 0.0 {
            Some(failed / (failed + passed))
        } else {
            None
        }
    }
}
