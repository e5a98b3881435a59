//! Ownership trait for member-owned resources.
//!
//! Reservations (and everything hanging off them) belong to exactly one
//! member. Implementors expose the owner and get a uniform check that
//! produces an `Unauthorized` error.
//!
//! # Example
//!
//! ```ignore
//! impl OwnedByUser for Reservation {
//!     fn owner_id(&self) -> &UserId {
//!         &self.member_id
//!     }
//! }
//!
//! reservation.check_ownership(&principal.user_id)?;
//! ```

use super::{BookingError, UserId};

/// Trait for aggregates that have a single owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this resource.
    fn owner_id(&self) -> &UserId;

    /// Checks if the given user is the owner.
    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Validates ownership, returning `Unauthorized` if the user is not the owner.
    fn check_ownership(&self, user_id: &UserId) -> Result<(), BookingError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(BookingError::unauthorized(format!(
                "User {} does not own this resource",
                user_id
            )))
        }
    }
}
