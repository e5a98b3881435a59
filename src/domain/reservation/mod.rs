//! Reservation module - time windows, pricing, conflicts and lifecycle.
//!
//! # Lifecycle
//!
//! A reservation is created PENDING once the conflict checker reports the
//! window free. Settlement confirms it; check-in and check-out drive it to
//! COMPLETED. Cancellation is legal until completion; a confirmed stay that
//! was never started can be swept to NO_SHOW after its window ends.

mod aggregate;
mod check_in;
mod conflict;
mod pricing;
mod status;
mod window;

pub use aggregate::Reservation;
pub use check_in::CheckInPolicy;
pub use conflict::{find_conflict, has_conflict};
pub use pricing::price_for;
pub use status::ReservationStatus;
pub use window::TimeWindow;
