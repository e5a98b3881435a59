//! Notification dispatcher port.
//!
//! Fire-and-forget delivery of member notifications. The core only looks at
//! the result to log failures; it never retries or rolls back because of
//! one.

use crate::domain::foundation::UserId;
use crate::domain::payment::Payment;
use crate::domain::reservation::Reservation;
use async_trait::async_trait;
use thiserror::Error;

/// Delivery failure reported by a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Notification delivery failed: {0}")]
pub struct DispatchError(pub String);

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify_booking_confirmed(
        &self,
        recipient: &UserId,
        reservation: &Reservation,
    ) -> Result<(), DispatchError>;

    async fn notify_payment_succeeded(
        &self,
        recipient: &UserId,
        payment: &Payment,
    ) -> Result<(), DispatchError>;

    async fn notify_cancelled(
        &self,
        recipient: &UserId,
        reservation: &Reservation,
    ) -> Result<(), DispatchError>;
}
