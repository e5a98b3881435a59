//! Reservation aggregate.
//!
//! A member's hold on one space for one half-open time window. The
//! aggregate owns its lifecycle status; every mutation goes through the
//! status state machine and is stamped with the caller-supplied time.

use crate::domain::foundation::{
    BookingError, Money, OwnedByUser, PaymentId, ReservationId, SpaceId, StateMachine, Timestamp,
    UserId,
};
use crate::domain::space::Space;
use serde::{Deserialize, Serialize};

use super::{price_for, CheckInPolicy, ReservationStatus, TimeWindow};

/// Reservation aggregate.
///
/// # Invariants
///
/// - `window.start < window.end`
/// - `payment_id` is set exactly when the reservation has been confirmed
/// - `checked_in_at` is set once the member has checked in
/// - Status transitions follow [`ReservationStatus`] rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier for this reservation.
    pub id: ReservationId,

    /// Space being reserved.
    pub space_id: SpaceId,

    /// Member who owns the reservation.
    pub member_id: UserId,

    /// Reserved interval.
    pub window: TimeWindow,

    /// Current lifecycle status.
    pub status: ReservationStatus,

    /// Flat-rate price fixed at creation.
    pub total_price: Money,

    /// Payment that confirmed this reservation.
    pub payment_id: Option<PaymentId>,

    pub checked_in_at: Option<Timestamp>,

    pub checked_out_at: Option<Timestamp>,

    pub cancelled_at: Option<Timestamp>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,
}

impl Reservation {
    /// Creates a PENDING reservation priced from the space's hourly rate.
    ///
    /// The caller has already established that the window is free.
    pub fn create_pending(
        id: ReservationId,
        space: &Space,
        member_id: UserId,
        window: TimeWindow,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            space_id: space.id,
            member_id,
            window,
            status: ReservationStatus::Pending,
            total_price: price_for(space.hourly_rate, &window),
            payment_id: None,
            checked_in_at: None,
            checked_out_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rejects settlement of anything but a PENDING reservation.
    ///
    /// Settlement calls this before charging so a double payment never
    /// reaches the gateway.
    pub fn ensure_payable(&self) -> Result<(), BookingError> {
        match self.status {
            ReservationStatus::Pending => Ok(()),
            ReservationStatus::Confirmed => Err(BookingError::invalid_transition(format!(
                "Reservation {} has already been paid",
                self.id
            ))),
            ReservationStatus::Cancelled => Err(BookingError::invalid_transition(format!(
                "Reservation {} is cancelled and cannot be paid",
                self.id
            ))),
            other => Err(BookingError::invalid_transition(format!(
                "Only pending reservations can be paid (reservation {} is {})",
                self.id,
                other.as_str()
            ))),
        }
    }

    /// Confirms the reservation as part of payment settlement.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the reservation is already confirmed (double
    /// payment), cancelled, or otherwise not PENDING.
    pub fn confirm(&mut self, payment_id: PaymentId, now: Timestamp) -> Result<(), BookingError> {
        self.ensure_payable()?;
        self.status = self.status.transition_to(ReservationStatus::Confirmed)?;
        self.payment_id = Some(payment_id);
        self.updated_at = now;
        Ok(())
    }

    /// Checks the member in.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless CONFIRMED and `now` is inside the check-in
    /// bounds of `policy`.
    pub fn check_in(&mut self, now: Timestamp, policy: &CheckInPolicy) -> Result<(), BookingError> {
        if self.status != ReservationStatus::Confirmed {
            return Err(BookingError::invalid_transition(format!(
                "Only confirmed reservations can be checked in (reservation {} is {})",
                self.id,
                self.status.as_str()
            )));
        }
        policy.check(&self.window, now)?;
        self.status = self.status.transition_to(ReservationStatus::CheckedIn)?;
        self.checked_in_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Checks the member out. Unconditional once checked in.
    pub fn check_out(&mut self, now: Timestamp) -> Result<(), BookingError> {
        if self.status != ReservationStatus::CheckedIn {
            return Err(BookingError::invalid_transition(format!(
                "Only checked-in reservations can be checked out (reservation {} is {})",
                self.id,
                self.status.as_str()
            )));
        }
        self.status = self.status.transition_to(ReservationStatus::Completed)?;
        self.checked_out_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Cancels the reservation. Returns the status it was cancelled from so
    /// the caller can release the space or refund the payment.
    pub fn cancel(&mut self, now: Timestamp) -> Result<ReservationStatus, BookingError> {
        let previous = self.status;
        self.status = self.status.transition_to(ReservationStatus::Cancelled)?;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(previous)
    }

    /// Marks a confirmed reservation whose window has passed as a no-show.
    pub fn mark_no_show(&mut self, now: Timestamp) -> Result<(), BookingError> {
        if self.status != ReservationStatus::Confirmed {
            return Err(BookingError::invalid_transition(format!(
                "Only confirmed reservations can be marked as no-show (reservation {} is {})",
                self.id,
                self.status.as_str()
            )));
        }
        if !now.is_after(&self.window.end()) {
            return Err(BookingError::invalid_transition(format!(
                "Reservation {} has not ended yet",
                self.id
            )));
        }
        self.status = self.status.transition_to(ReservationStatus::NoShow)?;
        self.updated_at = now;
        Ok(())
    }
}

impl OwnedByUser for Reservation {
    fn owner_id(&self) -> &UserId {
        &self.member_id
    }
}
