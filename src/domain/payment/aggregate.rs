//! Payment aggregate.
//!
//! Created by settlement once the gateway has accepted a charge. After that
//! the only legal mutation is the refund flag set when the reservation it
//! paid for is cancelled.

use crate::domain::foundation::{
    BookingError, Currency, Money, OwnedByUser, PaymentId, ReservationId, StateMachine, Timestamp,
    UserId,
};
use serde::{Deserialize, Serialize};

use super::{PaymentMethod, PaymentStatus};

/// A settled (or refunded) payment for one reservation.
///
/// # Invariants
///
/// - One payment per reservation
/// - `amount` is positive
/// - `transaction_id` and `settled_at` are set once COMPLETED
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub reservation_id: ReservationId,
    /// Member who paid; copied from the reservation.
    pub member_id: UserId,
    pub amount: Money,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Gateway reference for the charge.
    pub transaction_id: Option<String>,
    pub settled_at: Option<Timestamp>,
    pub refunded_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Payment {
    /// Creates a pending payment record.
    ///
    /// # Errors
    ///
    /// `Validation` if `amount` is zero or negative.
    pub fn new_pending(
        id: PaymentId,
        reservation_id: ReservationId,
        member_id: UserId,
        amount: Money,
        currency: Currency,
        method: PaymentMethod,
        now: Timestamp,
    ) -> Result<Self, BookingError> {
        if !amount.is_positive() {
            return Err(BookingError::validation(
                "amount",
                format!("Payment amount must be positive, got {}", amount),
            ));
        }
        Ok(Self {
            id,
            reservation_id,
            member_id,
            amount,
            currency,
            method,
            status: PaymentStatus::Pending,
            transaction_id: None,
            settled_at: None,
            refunded_at: None,
            created_at: now,
        })
    }

    /// Records the gateway's acceptance of the charge.
    pub fn complete(&mut self, transaction_id: impl Into<String>, now: Timestamp) -> Result<(), BookingError> {
        self.status = self.status.transition_to(PaymentStatus::Completed)?;
        self.transaction_id = Some(transaction_id.into());
        self.settled_at = Some(now);
        Ok(())
    }

    /// Flags the payment as refunded. Only completed payments can be refunded.
    pub fn refund(&mut self, now: Timestamp) -> Result<(), BookingError> {
        self.status = self.status.transition_to(PaymentStatus::Refunded)?;
        self.refunded_at = Some(now);
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

impl OwnedByUser for Payment {
    fn owner_id(&self) -> &UserId {
        &self.member_id
    }
}
