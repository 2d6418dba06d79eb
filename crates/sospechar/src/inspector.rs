//! Stack Inspection
//!
//! `StackInspector` turns a view of a live execution frame into an owned,
//! immutable `FrameSnapshot`. The host program's stack mutates the moment the
//! instrumented code resumes, so a snapshot must never borrow from the frame
//! it describes: every function name, variable name, and rendered value is
//! deep-copied into owned strings.
//!
//! Bindings that cannot be rendered (a `Debug` impl that panics on a foreign
//! or poisoned value) degrade to [`VarRepr::Unavailable`] — introspection
//! failure never aborts tracing.

use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Rendered value of one local variable binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarRepr {
    /// The binding rendered via its `Debug` impl
    Value(String),
    /// The binding could not be introspected
    Unavailable,
}

impl fmt::Display for VarRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(repr) => f.write_str(repr),
            Self::Unavailable => f.write_str("<unavailable>"),
        }
    }
}

/// Borrowed view of a live execution frame
///
/// Built by instrumented code at a probe point. Holds references into the
/// running program; must not outlive the probe call.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    function: &'a str,
    line: u32,
    locals: &'a [(&'a str, &'a dyn fmt::Debug)],
}

impl<'a> FrameView<'a> {
    /// Create a frame view for the given function, line, and local bindings
    #[must_use]
    pub const fn new(
        function: &'a str,
        line: u32,
        locals: &'a [(&'a str, &'a dyn fmt::Debug)],
    ) -> Self {
        Self {
            function,
            line,
            locals,
        }
    }

    /// Function name of the frame
    #[must_use]
    pub const fn function(&self) -> &'a str {
        self.function
    }

    /// Current line of the frame
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Debug for FrameView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameView")
            .field("function", &self.function)
            .field("line", &self.line)
            .field("locals", &self.locals.len())
            .finish()
    }
}

/// Owned, immutable snapshot of one execution frame at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    function: String,
    location: Location,
    locals: Vec<(String, VarRepr)>,
    callers: Vec<Location>,
}

impl FrameSnapshot {
    /// Function name of the snapshotted frame
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Location of the snapshotted frame
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Local variable bindings in declaration order
    #[must_use]
    pub fn locals(&self) -> &[(String, VarRepr)] {
        &self.locals
    }

    /// Caller chain, outermost first
    #[must_use]
    pub fn callers(&self) -> &[Location] {
        &self.callers
    }

    /// Consume the snapshot, yielding its local bindings
    #[must_use]
    pub fn into_locals(self) -> Vec<(String, VarRepr)> {
        self.locals
    }
}

/// Snapshots live frames into owned records
#[derive(Debug, Clone, Copy, Default)]
pub struct StackInspector;

impl StackInspector {
    /// Create a new inspector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Snapshot a live frame together with its caller chain
    /// (outermost → innermost)
    ///
    /// Every binding is rendered eagerly; nothing in the result borrows from
    /// the frame. A binding whose rendering panics becomes
    /// [`VarRepr::Unavailable`].
    #[must_use]
    pub fn snapshot(&self, frame: &FrameView<'_>, callers: &[Location]) -> FrameSnapshot {
        let locals = frame
            .locals
            .iter()
            .map(|(name, value)| ((*name).to_string(), Self::render(name, *value)))
            .collect();

        FrameSnapshot {
            function: frame.function.to_string(),
            location: Location::new(frame.function, frame.line),
            locals,
            callers: callers.to_vec(),
        }
    }

    /// Render one binding, containing any panic from its `Debug` impl
    fn render(name: &str, value: &dyn fmt::Debug) -> VarRepr {
        let rendered = catch_unwind(AssertUnwindSafe(|| format!("{value:?}")));
        match rendered {
            Ok(repr) => VarRepr::Value(repr),
            Err(_) => {
                warn!(binding = name, "could not introspect binding, recording sentinel");
                VarRepr::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Snapshots own all their data — nothing borrows from the frame
    #[test]
    fn test_snapshot_is_owned() {
        let snapshot = {
            let x = 2;
            let y = 1;
            let locals: &[(&str, &dyn fmt::Debug)] = &[("x", &x), ("y", &y)];
            let frame = FrameView::new("middle", 4, locals);
            StackInspector::new().snapshot(&frame, &[Location::new("main", 1)])
        };
        // The frame and its borrows are gone; the snapshot still reads fully.
        assert_eq!(snapshot.function(), "middle");
        assert_eq!(snapshot.location(), &Location::new("middle", 4));
        assert_eq!(
            snapshot.locals(),
            &[
                ("x".to_string(), VarRepr::Value("2".to_string())),
                ("y".to_string(), VarRepr::Value("1".to_string())),
            ]
        );
        assert_eq!(snapshot.callers(), &[Location::new("main", 1)]);
    }

    /// A panicking Debug impl degrades to the Unavailable sentinel,
    /// not a snapshot failure
    #[test]
    fn test_opaque_binding_degrades_to_sentinel() {
        struct Opaque;
        impl fmt::Debug for Opaque {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("foreign value")
            }
        }

        let opaque = Opaque;
        let ok = 7_i32;
        let locals: &[(&str, &dyn fmt::Debug)] = &[("opaque", &opaque), ("ok", &ok)];
        let frame = FrameView::new("f", 10, locals);
        let snapshot = StackInspector::new().snapshot(&frame, &[]);

        assert_eq!(
            snapshot.locals(),
            &[
                ("opaque".to_string(), VarRepr::Unavailable),
                ("ok".to_string(), VarRepr::Value("7".to_string())),
            ]
        );
    }

    /// Introspection failure is reported through the log stream, not an
    /// error path
    #[test]
    fn test_introspection_failure_is_logged() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Sink(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Sink {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        struct Poisoned;
        impl fmt::Debug for Poisoned {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("poisoned value")
            }
        }

        let sink = Arc::new(Mutex::new(Vec::new()));
        let writer = Sink(Arc::clone(&sink));
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let poisoned = Poisoned;
            let locals: &[(&str, &dyn fmt::Debug)] = &[("poisoned", &poisoned)];
            let frame = FrameView::new("f", 5, locals);
            let snapshot = StackInspector::new().snapshot(&frame, &[]);
            assert_eq!(snapshot.locals()[0].1, VarRepr::Unavailable);
        });

        let output = String::from_utf8(sink.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("could not introspect binding"));
        assert!(output.contains("poisoned"));
    }

    #[test]
    fn test_var_repr_display() {
        assert_eq!(VarRepr::Value("3".to_string()).to_string(), "3");
        assert_eq!(VarRepr::Unavailable.to_string(), "<unavailable>");
    }

    /// Caller chain is preserved outermost → innermost
    #[test]
    fn test_caller_chain_order() {
        let locals: &[(&str, &dyn fmt::Debug)] = &[];
        let frame = FrameView::new("inner", 3, locals);
        let callers = [Location::new("main", 1), Location::new("outer", 2)];
        let snapshot = StackInspector::new().snapshot(&frame, &callers);
        assert_eq!(snapshot.callers(), &callers);
    }
}
