//! Clock port.
//!
//! Lifecycle guards compare against "now"; handlers read it from a `Clock`
//! so tests can pin time.

use crate::domain::foundation::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
