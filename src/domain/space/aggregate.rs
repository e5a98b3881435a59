//! Space aggregate.
//!
//! A bookable room or desk with a flat hourly rate. The catalog owns
//! creation and descriptive data; this crate only reads the rate and flips
//! the operational status when members check in and out.

use crate::domain::foundation::{BookingError, Money, SpaceId, StateMachine, ValidationError};
use serde::{Deserialize, Serialize};

use super::SpaceStatus;

/// A shared space that can be reserved.
///
/// # Invariants
///
/// - `hourly_rate` is never negative
/// - `capacity >= 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    pub hourly_rate: Money,
    pub capacity: u32,
    pub status: SpaceStatus,
}

impl Space {
    /// Creates an available space.
    pub fn new(
        id: SpaceId,
        name: impl Into<String>,
        hourly_rate: Money,
        capacity: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if hourly_rate.cents() < 0 {
            return Err(ValidationError::out_of_range(
                "hourly_rate",
                0,
                i64::MAX,
                hourly_rate.cents(),
            ));
        }
        if capacity == 0 {
            return Err(ValidationError::out_of_range("capacity", 1, i64::from(u32::MAX), 0));
        }
        Ok(Self {
            id,
            name,
            hourly_rate,
            capacity,
            status: SpaceStatus::Available,
        })
    }

    /// Returns a copy with the given status (catalog fixtures, row mapping).
    pub fn with_status(mut self, status: SpaceStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the space occupied by a checked-in reservation.
    pub fn occupy(&mut self) -> Result<(), BookingError> {
        self.status = self.status.transition_to(SpaceStatus::Occupied)?;
        Ok(())
    }

    /// Frees the space after check-out or cancellation of a checked-in stay.
    pub fn release(&mut self) -> Result<(), BookingError> {
        self.status = self.status.transition_to(SpaceStatus::Available)?;
        Ok(())
    }
}
