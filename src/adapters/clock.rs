//! Clock implementations.

use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// # Example
///
/// ```ignore
/// let clock = Arc::new(FixedClock::new(at(8, 50)));
/// check_in.handle(cmd).await?;
/// clock.set(at(10, 30));
/// check_out.handle(cmd).await?;
/// ```
#[derive(Debug)]
pub struct FixedClock {
    time: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(time: Timestamp) -> Self {
        Self {
            time: Mutex::new(time),
        }
    }

    pub fn set(&self, time: Timestamp) {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner) = time;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
        *time = time.plus_minutes(minutes);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.time.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
