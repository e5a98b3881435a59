//! Reservation lifecycle manager.
//!
//! Owns every reservation state transition and the space status changes
//! that go with them. Each operation works on a caller-supplied
//! transaction handle and never commits; the caller decides the boundary.
//!
//! | Operation | From | To | Space side effect |
//! |-----------|------|----|-------------------|
//! | create | - | PENDING | - |
//! | confirm | PENDING | CONFIRMED | - |
//! | check_in | CONFIRMED | CHECKED_IN | AVAILABLE -> OCCUPIED (kept if already occupied) |
//! | check_out | CHECKED_IN | COMPLETED | OCCUPIED -> AVAILABLE unless another stay is checked in |
//! | cancel | PENDING, CONFIRMED, CHECKED_IN | CANCELLED | released if checked in |
//! | mark_no_show | CONFIRMED (after end), staff only | NO_SHOW | - |

use crate::domain::foundation::{BookingError, PaymentId, ReservationId, SpaceId, Timestamp, UserId};
use crate::domain::payment::Payment;
use crate::domain::reservation::{find_conflict, CheckInPolicy, Reservation, ReservationStatus, TimeWindow};
use crate::domain::space::{Space, SpaceStatus};
use crate::domain::user::Principal;
use crate::ports::BookingTransaction;

const OVERRUN_LOOKBACK_MINUTES: i64 = 24 * 60;

/// Outcome of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub reservation: Reservation,
    /// The completed payment flagged REFUNDED, if there was one.
    pub refunded_payment: Option<Payment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservationLifecycle {
    check_in_policy: CheckInPolicy,
}

impl ReservationLifecycle {
    pub fn new(check_in_policy: CheckInPolicy) -> Self {
        Self { check_in_policy }
    }

    pub fn check_in_policy(&self) -> &CheckInPolicy {
        &self.check_in_policy
    }

    /// Creates a PENDING reservation after checking the window is free.
    ///
    /// Locks the space first, so concurrent creates on the same space
    /// serialize while other spaces proceed.
    pub async fn create(
        &self,
        tx: &mut dyn BookingTransaction,
        member_id: UserId,
        space_id: &SpaceId,
        window: TimeWindow,
        now: Timestamp,
    ) -> Result<Reservation, BookingError> {
        let space = load_space(tx, space_id).await?;
        if !space.status.accepts_reservations() {
            return Err(BookingError::validation(
                "space_id",
                format!("Space {} is {} and cannot be reserved", space.id, space.status.as_str()),
            ));
        }
        if tx.find_user(&member_id).await?.is_none() {
            return Err(BookingError::not_found("User", member_id));
        }

        let existing = tx.find_active_overlapping(space_id, &window).await?;
        if let Some(blocking) = find_conflict(&existing, space_id, &window) {
            tracing::debug!(
                space_id = %space_id,
                requested = %window,
                blocking_reservation = %blocking.id,
                "Requested window overlaps an active reservation"
            );
            return Err(BookingError::conflict(format!(
                "Space {} is not available for {}",
                space.name, window
            )));
        }

        let reservation = Reservation::create_pending(ReservationId::new(), &space, member_id, window, now);
        tx.insert_reservation(&reservation).await?;

        tracing::info!(
            reservation_id = %reservation.id,
            space_id = %space_id,
            member_id = %member_id,
            total_price = %reservation.total_price,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Loads a reservation or fails with `NotFound`.
    pub async fn load(&self, tx: &mut dyn BookingTransaction, id: &ReservationId) -> Result<Reservation, BookingError> {
        tx.find_reservation(id)
            .await?
            .ok_or_else(|| BookingError::not_found("Reservation", id))
    }

    /// PENDING -> CONFIRMED, linking the settling payment. Settlement only.
    pub async fn confirm(
        &self,
        tx: &mut dyn BookingTransaction,
        reservation: &mut Reservation,
        payment_id: PaymentId,
        now: Timestamp,
    ) -> Result<(), BookingError> {
        reservation.confirm(payment_id, now)?;
        tx.update_reservation(reservation).await?;
        tracing::info!(reservation_id = %reservation.id, payment_id = %payment_id, "Reservation confirmed");
        Ok(())
    }

    pub async fn check_in(
        &self,
        tx: &mut dyn BookingTransaction,
        principal: &Principal,
        id: &ReservationId,
        now: Timestamp,
    ) -> Result<Reservation, BookingError> {
        let mut reservation = self.load(tx, id).await?;
        principal.authorize(&reservation, &reservation.space_id)?;

        reservation.check_in(now, &self.check_in_policy)?;
        let mut space = load_space(tx, &reservation.space_id).await?;
        match space.status {
            SpaceStatus::Available => {
                space.occupy()?;
                tx.update_space_status(&space.id, space.status).await?;
            }
            // Back-to-back stay: the previous member has not checked out yet.
            SpaceStatus::Occupied => {
                tracing::debug!(space_id = %space.id, "Space already occupied; status unchanged");
            }
            SpaceStatus::Maintenance | SpaceStatus::Inactive => {
                return Err(BookingError::invalid_transition(format!(
                    "Space {} is {} and cannot be occupied",
                    space.id,
                    space.status.as_str()
                )));
            }
        }

        tx.update_reservation(&reservation).await?;

        tracing::info!(reservation_id = %reservation.id, space_id = %space.id, "Checked in");
        Ok(reservation)
    }

    pub async fn check_out(
        &self,
        tx: &mut dyn BookingTransaction,
        principal: &Principal,
        id: &ReservationId,
        now: Timestamp,
    ) -> Result<Reservation, BookingError> {
        let mut reservation = self.load(tx, id).await?;
        principal.authorize(&reservation, &reservation.space_id)?;

        reservation.check_out(now)?;
        tx.update_reservation(&reservation).await?;
        release_space(tx, &reservation, now).await?;

        tracing::info!(reservation_id = %reservation.id, space_id = %reservation.space_id, "Checked out");
        Ok(reservation)
    }

    /// Cancels any not-yet-completed reservation.
    ///
    /// A completed payment is flagged REFUNDED and a checked-in stay frees
    /// its space, both in the caller's transaction.
    pub async fn cancel(
        &self,
        tx: &mut dyn BookingTransaction,
        principal: &Principal,
        id: &ReservationId,
        now: Timestamp,
    ) -> Result<Cancellation, BookingError> {
        let mut reservation = self.load(tx, id).await?;
        principal.authorize(&reservation, &reservation.space_id)?;

        let previous = reservation.cancel(now)?;
        tx.update_reservation(&reservation).await?;

        if previous == ReservationStatus::CheckedIn {
            release_space(tx, &reservation, now).await?;
        }

        let refunded_payment = match tx.find_payment_for_reservation(id).await? {
            Some(mut payment) if payment.is_completed() => {
                payment.refund(now)?;
                tx.update_payment(&payment).await?;
                Some(payment)
            }
            _ => None,
        };

        tracing::info!(
            reservation_id = %reservation.id,
            previous_status = previous.as_str(),
            refunded = refunded_payment.is_some(),
            "Reservation cancelled"
        );
        Ok(Cancellation {
            reservation,
            refunded_payment,
        })
    }

    /// CONFIRMED -> NO_SHOW once the window has passed. Invoked by an
    /// external sweep; nothing here schedules it.
    pub async fn mark_no_show(
        &self,
        tx: &mut dyn BookingTransaction,
        principal: &Principal,
        id: &ReservationId,
        now: Timestamp,
    ) -> Result<Reservation, BookingError> {
        principal.require_staff()?;
        let mut reservation = self.load(tx, id).await?;
        principal.authorize(&reservation, &reservation.space_id)?;

        reservation.mark_no_show(now)?;
        tx.update_reservation(&reservation).await?;

        tracing::info!(reservation_id = %reservation.id, "Reservation marked as no-show");
        Ok(reservation)
    }
}

async fn load_space(tx: &mut dyn BookingTransaction, id: &SpaceId) -> Result<Space, BookingError> {
    tx.find_space(id)
        .await?
        .ok_or_else(|| BookingError::not_found("Space", id))
}

/// OCCUPIED -> AVAILABLE once `leaving` is out. A space still hosting
/// another checked-in stay, or one the catalog moved out of OCCUPIED
/// meanwhile, keeps its status.
async fn release_space(
    tx: &mut dyn BookingTransaction,
    leaving: &Reservation,
    now: Timestamp,
) -> Result<(), BookingError> {
    let id = &leaving.space_id;
    let mut space = load_space(tx, id).await?;
    if space.status != SpaceStatus::Occupied {
        tracing::warn!(space_id = %id, status = space.status.as_str(), "Space was not occupied; leaving status unchanged");
        return Ok(());
    }

    // Overrunning stays hold the space past their end, so look back a day.
    let recent = TimeWindow::new(now.minus_minutes(OVERRUN_LOOKBACK_MINUTES), now.plus_minutes(1))?;
    let still_in = tx
        .find_active_overlapping(id, &recent)
        .await?
        .into_iter()
        .any(|r| r.id != leaving.id && r.status == ReservationStatus::CheckedIn);
    if still_in {
        tracing::debug!(space_id = %id, "Another stay is checked in; space stays occupied");
        return Ok(());
    }

    space.release()?;
    tx.update_space_status(id, space.status).await?;
    Ok(())
}
