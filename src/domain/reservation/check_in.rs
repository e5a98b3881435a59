//! Time guard for check-in.

use crate::domain::foundation::{BookingError, Timestamp};

use super::TimeWindow;

/// Check-in is allowed from `start - early_minutes` up to and including
/// `end + grace_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInPolicy {
    pub early_minutes: i64,
    pub grace_minutes: i64,
}

impl Default for CheckInPolicy {
    fn default() -> Self {
        Self {
            early_minutes: 15,
            grace_minutes: 0,
        }
    }
}

impl CheckInPolicy {
    pub fn new(early_minutes: i64, grace_minutes: i64) -> Self {
        Self {
            early_minutes,
            grace_minutes,
        }
    }

    /// Earliest instant a member may check in.
    pub fn opens_at(&self, window: &TimeWindow) -> Timestamp {
        window.start().minus_minutes(self.early_minutes)
    }

    /// Latest instant a member may check in.
    pub fn closes_at(&self, window: &TimeWindow) -> Timestamp {
        window.end().plus_minutes(self.grace_minutes)
    }

    /// # Errors
    ///
    /// `InvalidTransition` when `now` is before the window opens ("too early")
    /// or after it closes ("expired").
    pub fn check(&self, window: &TimeWindow, now: Timestamp) -> Result<(), BookingError> {
        let opens = self.opens_at(window);
        if now.is_before(&opens) {
            return Err(BookingError::invalid_transition(format!(
                "Check-in is too early; it opens at {}",
                opens
            )));
        }
        let closes = self.closes_at(window);
        if now.is_after(&closes) {
            return Err(BookingError::invalid_transition(format!(
                "Reservation has expired; check-in closed at {}",
                closes
            )));
        }
        Ok(())
    }
}
