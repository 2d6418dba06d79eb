//! Source Locations
//!
//! A `Location` is the primary key of the whole engine: every event, every
//! coverage row, and every suspiciousness score is keyed by a
//! `(function name, line number)` pair.
//!
//! The derived `Ord` (function name first, then line) doubles as the
//! deterministic tie-break order for equally suspicious locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the program under test, identified by function name and line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    function: String,
    line: u32,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(function: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            line,
        }
    }

    /// Name of the function containing this location
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Line number within the source of that function
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.function, self.line)
    }
}
