//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state machine trait and the error
//! taxonomy that form the vocabulary of the booking domain.

mod errors;
mod ids;
mod money;
mod ownership;
mod state_machine;
mod timestamp;

pub use errors::{BookingError, ErrorCode, TransientReason, ValidationError};
pub use ids::{
    InvoiceId, InvoiceItemId, NotificationId, PaymentId, ReservationId, SpaceId, UserId,
};
pub use money::{div_round_half_even, Currency, Money};
pub use ownership::OwnedByUser;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
