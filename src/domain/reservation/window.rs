//! Half-open booking interval.

use crate::domain::foundation::{Timestamp, ValidationError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The interval `[start, end)` a reservation holds a space for.
///
/// # Invariants
///
/// - `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start: Timestamp,
    end: Timestamp,
}

impl TimeWindow {
    /// Creates a window, rejecting empty or inverted intervals.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if !start.is_before(&end) {
            return Err(ValidationError::invalid_format(
                "time_window",
                format!("start ({}) must be strictly before end ({})", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end.duration_since(&self.start)
    }

    /// Standard half-open overlap test: `self.start < other.end && self.end > other.start`.
    ///
    /// Back-to-back windows (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start.is_before(&other.end) && self.end.is_after(&other.start)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
