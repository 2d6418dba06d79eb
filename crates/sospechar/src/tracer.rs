//! Event Tracing
//!
//! [`EventTracer`] instruments exactly one bounded execution. Instrumented
//! code reports through the [`ProbeHandle`] hook surface (`call`, `line`,
//! `ret`, `raise`); each probe emits one [`TraceEvent`] in causal order,
//! synchronously on the target's own thread, straight to the registered
//! [`Collector`].
//!
//! The tracer guarantees clean detachment on every exit path: a normal return
//! hands the harness a [`TracedRun`] to finish with the externally judged
//! [`Outcome`]; a panic escaping the target finalizes the collector with
//! `Outcome::Fail` and the captured exception before the unwind is allowed to
//! continue. Tracing never swallows the target's own fault.
//!
//! Tracer state lives on the per-run value, not in ambient globals, so
//! independent fault-localization sessions can coexist in one process.

use crate::collector::{Collector, ExceptionInfo, Outcome, Trace};
use crate::inspector::{FrameView, StackInspector, VarRepr};
use crate::location::Location;
use crate::result::SospecharResult;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use tracing::warn;

/// Kind of a traced event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A source line executed
    Line,
    /// A function was entered
    Call,
    /// A function returned
    Return,
    /// An exception was raised at this point
    Exception,
}

/// One instrumentation event of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    kind: EventKind,
    location: Location,
    sequence: u64,
    locals: Vec<(String, VarRepr)>,
    depth: usize,
}

impl TraceEvent {
    /// Create an event
    #[must_use]
    pub fn new(
        kind: EventKind,
        location: Location,
        sequence: u64,
        locals: Vec<(String, VarRepr)>,
        depth: usize,
    ) -> Self {
        Self {
            kind,
            location,
            sequence,
            locals,
            depth,
        }
    }

    /// Kind of the event
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Location the event occurred at
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Position of the event in the run's causal order
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Snapshot of local variable bindings at the event
    #[must_use]
    pub fn locals(&self) -> &[(String, VarRepr)] {
        &self.locals
    }

    /// Call-stack depth at the event (1 = entry frame)
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
}

/// Capture local bindings for a probe call: `locals![x, y, z]`
///
/// Expands to the `&[(&str, &dyn Debug)]` slice the [`ProbeHandle`] probes
/// expect, naming each binding after the variable.
#[macro_export]
macro_rules! locals {
    () => {
        &[] as &[(&str, &dyn ::std::fmt::Debug)]
    };
    ($($name:ident),+ $(,)?) => {
        &[$((stringify!($name), &$name as &dyn ::std::fmt::Debug)),+]
    };
}

/// Instruments one bounded execution, delivering events to a collector
#[derive(Debug)]
pub struct EventTracer<C: Collector> {
    collector: C,
    inspector: StackInspector,
    sequence: u64,
    frames: Vec<Location>,
}

impl<C: Collector> EventTracer<C> {
    /// Create a tracer for one run, delivering to the given collector
    #[must_use]
    pub fn new(collector: C) -> Self {
        Self {
            collector,
            inspector: StackInspector::new(),
            sequence: 0,
            frames: Vec::new(),
        }
    }

    /// Trace one bounded execution of `target`
    ///
    /// The target receives the probe handle and reports its own execution
    /// through it. On normal return the collector is left open and the
    /// harness supplies the outcome via [`TracedRun::finish`]; on panic the
    /// collector is finalized as `Outcome::Fail` with the captured exception
    /// and the panic payload is returned for re-raising.
    pub fn run<T, F>(mut self, target: F) -> RunStatus<T, C>
    where
        F: FnOnce(&mut ProbeHandle<'_, C>) -> T,
    {
        let result = {
            let mut probe = ProbeHandle { tracer: &mut self };
            catch_unwind(AssertUnwindSafe(|| target(&mut probe)))
        };

        match result {
            Ok(value) => RunStatus::Completed(TracedRun {
                collector: self.collector,
                value,
            }),
            Err(payload) => {
                let info = ExceptionInfo::from_panic(payload.as_ref());
                warn!(exception = %info, "traced run panicked, finalizing as FAIL");
                let trace = self
                    .collector
                    .finalize(Outcome::Fail, Some(info))
                    .expect("collector is finalized exactly once per run");
                RunStatus::Panicked { trace, payload }
            }
        }
    }

    fn emit(&mut self, kind: EventKind, frame: &FrameView<'_>) {
        let snapshot = self.inspector.snapshot(frame, self.caller_chain(kind));
        let event = TraceEvent {
            kind,
            location: snapshot.location().clone(),
            sequence: self.sequence,
            locals: snapshot.into_locals(),
            depth: self.frames.len(),
        };
        self.sequence += 1;
        // Collector faults degrade to a log line: instrumentation overhead
        // must never mask the target's behavior.
        if let Err(error) = self.collector.on_event(event) {
            warn!(%error, "collector rejected event, continuing run");
        }
    }

    /// Caller chain for an event's snapshot, outermost first
    ///
    /// A Call's own frame is already on the stack when the event is emitted;
    /// its chain stops at the frame below it.
    fn caller_chain(&self, kind: EventKind) -> &[Location] {
        match kind {
            EventKind::Call => self
                .frames
                .split_last()
                .map_or(&[][..], |(_, callers)| callers),
            _ => &self.frames,
        }
    }
}

/// Hook surface handed to the instrumented target
///
/// Each probe emits one event. The handle borrows the tracer for the run's
/// duration, so events cannot outlive the run that produced them.
#[derive(Debug)]
pub struct ProbeHandle<'t, C: Collector> {
    tracer: &'t mut EventTracer<C>,
}

impl<C: Collector> ProbeHandle<'_, C> {
    /// Report entry into `function` at `line` with the given arguments
    pub fn call(&mut self, function: &str, line: u32, locals: &[(&str, &dyn fmt::Debug)]) {
        self.tracer
            .frames
            .push(Location::new(function, line));
        let frame = FrameView::new(function, line, locals);
        self.tracer.emit(EventKind::Call, &frame);
    }

    /// Report execution of `line` inside `function`
    pub fn line(&mut self, function: &str, line: u32, locals: &[(&str, &dyn fmt::Debug)]) {
        let frame = FrameView::new(function, line, locals);
        self.tracer.emit(EventKind::Line, &frame);
    }

    /// Report return from `function` at `line`
    pub fn ret(&mut self, function: &str, line: u32, locals: &[(&str, &dyn fmt::Debug)]) {
        let frame = FrameView::new(function, line, locals);
        self.tracer.emit(EventKind::Return, &frame);
        self.tracer.frames.pop();
    }

    /// Report an exception raised in `function` at `line`
    pub fn raise(&mut self, function: &str, line: u32, locals: &[(&str, &dyn fmt::Debug)]) {
        let frame = FrameView::new(function, line, locals);
        self.tracer.emit(EventKind::Exception, &frame);
    }

    /// Current call-stack depth as seen by the tracer
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tracer.frames.len()
    }
}

/// A run that completed without panicking; awaiting the external judgment
#[derive(Debug)]
#[must_use = "an unfinished run never finalizes its collector; call `finish` with an outcome"]
pub struct TracedRun<T, C: Collector> {
    collector: C,
    value: T,
}

impl<T, C: Collector> TracedRun<T, C> {
    /// The target's return value, for the harness's oracle to inspect
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Finalize the run with the harness-supplied outcome
    pub fn finish(mut self, outcome: Outcome) -> SospecharResult<(Trace, T)> {
        let trace = self.collector.finalize(outcome, None)?;
        Ok((trace, self.value))
    }
}

/// How one traced run ended
#[must_use = "inspect the status or call `propagate` so a captured panic is not silently dropped"]
pub enum RunStatus<T, C: Collector> {
    /// Normal completion; outcome still to be judged by the harness
    Completed(TracedRun<T, C>),
    /// The target panicked; the trace is already finalized as FAIL
    Panicked {
        /// The finalized trace, exception attached
        trace: Trace,
        /// The original panic payload, for re-raising
        payload: Box<dyn Any + Send>,
    },
}

impl<T, C: Collector> fmt::Debug for RunStatus<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(_) => f.write_str("RunStatus::Completed"),
            Self::Panicked { trace, .. } => f
                .debug_struct("RunStatus::Panicked")
                .field("trace", trace)
                .finish_non_exhaustive(),
        }
    }
}

impl<T, C: Collector> RunStatus<T, C> {
    /// Whether the run panicked
    #[must_use]
    pub const fn is_panicked(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }

    /// Unwrap the completed run, re-raising the target's panic otherwise
    ///
    /// For harnesses that do not keep traces of panicked runs; the panic
    /// continues propagating exactly as it would have untraced.
    pub fn propagate(self) -> TracedRun<T, C> {
        match self {
            Self::Completed(run) => run,
            Self::Panicked { payload, .. } => resume_unwind(payload),
        }
    }
}
