//! Sospechar: Statistical Fault Localization
//!
//! Sospechar (Spanish: "to suspect") turns many traced test executions into a
//! ranked list of suspect source locations. It instruments each run of a
//! program under test, records which `(function, line)` locations execute,
//! labels runs as passing or failing, and scores locations by how strongly
//! their execution correlates with failure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    SOSPECHAR Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  target run ─► EventTracer ─► Collector ─► Trace                 │
//! │                   │  (StackInspector snapshots)                  │
//! │  Trace ─► StatisticalDebugger ─► CoverageTable                   │
//! │              │                                                   │
//! │  DifferenceDebugger ─► SpectrumDebugger ─► rank / buckets        │
//! │   (pass/fail split)    (Tarantula, Ochiai)   (external renderer) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pass/fail oracle, the rendering layer, and any persistence live
//! outside this crate; sospechar is the in-process core between a test
//! harness and a visualization layer.
//!
//! # Example
//!
//! ```
//! use sospechar::{locals, Outcome, TarantulaDebugger, TarantulaMetric};
//!
//! let mut debugger = TarantulaDebugger::new(TarantulaMetric::new());
//! for (input, expected) in [(2, 4), (3, 6), (0, 0)] {
//!     let _ = debugger
//!         .observe(
//!             |probe| {
//!                 probe.call("double", 1, locals![input]);
//!                 probe.line("double", 2, locals![input]);
//!                 probe.ret("double", 3, locals![input]);
//!                 input * 2
//!             },
//!             |result| {
//!                 if *result == expected {
//!                     Outcome::Pass
//!                 } else {
//!                     Outcome::Fail
//!                 }
//!             },
//!         )
//!         .unwrap();
//! }
//! for (location, score) in debugger.rank() {
//!     println!("{location}  {score:.2}");
//! }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod collector;
pub mod debugger;
pub mod inspector;
pub mod location;
pub mod result;
pub mod spectrum;
pub mod tracer;

pub use collector::{Collector, CoverageCollector, ExceptionInfo, Outcome, Trace};
pub use debugger::{
    CoverageTable, DifferenceDebugger, LocationCounts, RunId, StatisticalDebugger,
};
pub use inspector::{FrameSnapshot, FrameView, StackInspector, VarRepr};
pub use location::Location;
pub use result::{SospecharError, SospecharResult};
pub use spectrum::{
    Bucket, BucketConfig, BucketConfigBuilder, DiscreteSpectrumDebugger, OchiaiDebugger,
    OchiaiMetric, SpectrumDebugger, SuspiciousnessMetric, TarantulaDebugger, TarantulaMetric,
    DEFAULT_BINS,
};
pub use tracer::{EventKind, EventTracer, ProbeHandle, RunStatus, TraceEvent, TracedRun};
