//! Cross-Run Statistical Aggregation
//!
//! The session half of the engine: traces committed run by run into an
//! append-only [`CoverageTable`], partitioned by outcome, summarized as
//! per-location pass/fail hit counts for the spectrum metrics.
//!
//! ```text
//! Trace ──add_trace──► StatisticalDebugger ──► CoverageTable
//!                              │
//!                     DifferenceDebugger ──► LocationCounts (per location)
//! ```

mod difference;
mod session;
mod table;

pub use difference::{DifferenceDebugger, LocationCounts};
pub use session::StatisticalDebugger;
pub use table::{CoverageTable, RunId};

#[cfg(test)]
mod tests;
