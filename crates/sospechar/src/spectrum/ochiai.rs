//! Ochiai Metric
//!
//! The Ochiai coefficient, borrowed from molecular biology and applied to
//! fault localization by Abreu et al.:
//!
//! ```text
//! score = failedHits / sqrt(totalFailed · (failedHits + passedHits))
//! ```
//!
//! Undefined when the denominator is zero (no failing runs, or the location
//! was never hit).

use super::SuspiciousnessMetric;
use crate::debugger::LocationCounts;

/// The Ochiai suspiciousness formula
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OchiaiMetric;

impl OchiaiMetric {
    /// Create the metric
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SuspiciousnessMetric for OchiaiMetric {
    fn name(&self) -> &'static str {
        "ochiai"
    }

    fn score(&self, counts: &LocationCounts) -> Option<f64> {
        let denominator =
            ((counts.total_failed * (counts.failed_hits + counts.passed_hits)) as f64).sqrt();
        if denominator > 0.0 {
            Some(counts.failed_hits as f64 / denominator)
        } else {
            None
        }
    }
}
