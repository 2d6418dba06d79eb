//! Run Collection
//!
//! A [`Collector`] consumes the event stream of exactly one run and finalizes
//! it into an immutable [`Trace`]. The concrete [`CoverageCollector`] records
//! the set of touched locations (in first-touch order, with per-location hit
//! counts) plus the full ordered event log.
//!
//! Contract: `on_event` may be called any number of times; `finalize` exactly
//! once. Either call after finalize reports
//! [`SospecharError::InvalidState`](crate::SospecharError::InvalidState).

use crate::location::Location;
use crate::result::{SospecharError, SospecharResult};
use crate::tracer::{EventKind, TraceEvent};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Classification of one run, supplied by the external harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The run satisfied its oracle
    Pass,
    /// The run violated its oracle (or panicked)
    Fail,
    /// The oracle could not classify the run
    Unresolved,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail => f.write_str("FAIL"),
            Self::Unresolved => f.write_str("UNRESOLVED"),
        }
    }
}

/// Owned description of an exception (panic) that escaped a traced run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    kind: String,
    message: String,
}

impl ExceptionInfo {
    /// Create an exception record
    #[must_use]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Build an exception record from a caught panic payload
    ///
    /// `&str` and `String` payloads keep their message; anything else is
    /// recorded with a placeholder message.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        Self::new("panic", message)
    }

    /// Kind of the exception (e.g. `"panic"`)
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Immutable record of one run
///
/// Produced by [`Collector::finalize`]; exposes read-only accessors only, so
/// the outcome and coverage cannot change after the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    events: Vec<TraceEvent>,
    hits: Vec<(Location, u64)>,
    outcome: Outcome,
    exception: Option<ExceptionInfo>,
    entry_point: Option<String>,
    arg_string: Option<String>,
}

impl Trace {
    /// The ordered event log of the run
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Covered locations with per-location hit counts, in first-touch order
    #[must_use]
    pub fn hits(&self) -> &[(Location, u64)] {
        &self.hits
    }

    /// Covered locations in first-touch order
    pub fn coverage(&self) -> impl Iterator<Item = &Location> {
        self.hits.iter().map(|(location, _)| location)
    }

    /// Whether the run touched the given location
    #[must_use]
    pub fn covers(&self, location: &Location) -> bool {
        self.hits.iter().any(|(touched, _)| touched == location)
    }

    /// Number of events recorded at the given location
    #[must_use]
    pub fn hit_count(&self, location: &Location) -> u64 {
        self.hits
            .iter()
            .find(|(touched, _)| touched == location)
            .map_or(0, |(_, count)| *count)
    }

    /// Outcome of the run
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The exception that escaped the run, if any
    #[must_use]
    pub const fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    /// Function name of the first call observed in the run
    #[must_use]
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    /// Rendered arguments of the first call observed in the run
    #[must_use]
    pub fn arg_string(&self) -> Option<&str> {
        self.arg_string.as_deref()
    }

    /// Printable identity of the run, e.g. `"middle(x=2, y=1, z=3)"`
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.entry_point
            .as_ref()
            .map(|entry| format!("{}({})", entry, self.arg_string.as_deref().unwrap_or("")))
    }
}

/// Consumes the event stream of one run and finalizes it into a [`Trace`]
///
/// Other analyses extend the engine here: an implementation decides what to
/// keep per event, and `finalize` packages it. `finalize` consumes the
/// collector logically — the contract is enforced at runtime so collectors
/// stay object-safe behind `dyn Collector`.
pub trait Collector {
    /// Deliver one event of the current run
    fn on_event(&mut self, event: TraceEvent) -> SospecharResult<()>;

    /// Finalize the run into an immutable trace; valid exactly once
    fn finalize(
        &mut self,
        outcome: Outcome,
        exception: Option<ExceptionInfo>,
    ) -> SospecharResult<Trace>;
}

/// Collector tracking touched locations and the full event log
#[derive(Debug, Default)]
pub struct CoverageCollector {
    events: Vec<TraceEvent>,
    touched: Vec<Location>,
    counts: HashMap<Location, u64>,
    entry_point: Option<String>,
    arg_string: Option<String>,
    finalized: bool,
}

impl CoverageCollector {
    /// Create an empty collector for one run
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locations touched so far, in first-touch order
    #[must_use]
    pub fn coverage(&self) -> &[Location] {
        &self.touched
    }

    /// Events recorded so far
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }
}

impl Collector for CoverageCollector {
    fn on_event(&mut self, event: TraceEvent) -> SospecharResult<()> {
        if self.finalized {
            return Err(SospecharError::invalid_state(
                "on_event called on a finalized collector",
            ));
        }

        // The first call event names the run: "middle(x=2, y=1, z=3)"
        if self.entry_point.is_none() && event.kind() == EventKind::Call {
            self.entry_point = Some(event.location().function().to_string());
            self.arg_string = Some(
                event
                    .locals()
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        let location = event.location().clone();
        let count = self.counts.entry(location.clone()).or_insert(0);
        if *count == 0 {
            self.touched.push(location);
        }
        *count += 1;

        self.events.push(event);
        Ok(())
    }

    fn finalize(
        &mut self,
        outcome: Outcome,
        exception: Option<ExceptionInfo>,
    ) -> SospecharResult<Trace> {
        if self.finalized {
            return Err(SospecharError::invalid_state(
                "finalize called on a finalized collector",
            ));
        }
        self.finalized = true;

        let hits = std::mem::take(&mut self.touched)
            .into_iter()
            .map(|location| {
                let count = self.counts.get(&location).copied().unwrap_or(0);
                (location, count)
            })
            .collect();

        Ok(Trace {
            events: std::mem::take(&mut self.events),
            hits,
            outcome,
            exception,
            entry_point: self.entry_point.take(),
            arg_string: self.arg_string.take(),
        })
    }
}
