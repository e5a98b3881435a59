//! GetReservationHandler - reads one reservation with its payment status.

use serde::Serialize;

use crate::application::{ReservationLifecycle, TransactionRunner};
use crate::domain::foundation::{BookingError, Money, ReservationId, SpaceId, Timestamp, UserId};
use crate::domain::payment::PaymentStatus;
use crate::domain::reservation::{Reservation, ReservationStatus};
use crate::domain::user::Principal;
use crate::ports::{BookingTransaction, IsolationLevel};

/// Read model for a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationView {
    pub reservation_id: ReservationId,
    pub space_id: SpaceId,
    pub space_name: String,
    pub member_id: UserId,
    pub start: Timestamp,
    pub end: Timestamp,
    pub status: ReservationStatus,
    pub total_price: Money,
    /// PENDING until a payment exists.
    pub payment_status: PaymentStatus,
}

impl ReservationView {
    /// Builds the view inside an open transaction.
    pub(crate) async fn load(
        tx: &mut dyn BookingTransaction,
        reservation: Reservation,
    ) -> Result<Self, BookingError> {
        let space = tx
            .find_space(&reservation.space_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Space", reservation.space_id))?;
        let payment_status = tx
            .find_payment_for_reservation(&reservation.id)
            .await?
            .map(|p| p.status)
            .unwrap_or(PaymentStatus::Pending);

        Ok(Self {
            reservation_id: reservation.id,
            space_id: reservation.space_id,
            space_name: space.name,
            member_id: reservation.member_id,
            start: reservation.window.start(),
            end: reservation.window.end(),
            status: reservation.status,
            total_price: reservation.total_price,
            payment_status,
        })
    }
}

pub struct GetReservationHandler {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
}

impl GetReservationHandler {
    pub fn new(runner: TransactionRunner, lifecycle: ReservationLifecycle) -> Self {
        Self { runner, lifecycle }
    }

    #[tracing::instrument(skip(self, principal), fields(actor = %principal.user_id))]
    pub async fn handle(&self, principal: &Principal, reservation_id: ReservationId) -> Result<ReservationView, BookingError> {
        let lifecycle = &self.lifecycle;
        let id = &reservation_id;

        self.runner
            .run("get_reservation", IsolationLevel::ReadCommitted, move |mut tx| async move {
                let reservation = lifecycle.load(tx.as_mut(), id).await?;
                principal.authorize(&reservation, &reservation.space_id)?;
                let view = ReservationView::load(tx.as_mut(), reservation).await?;
                tx.rollback().await?;
                Ok(view)
            })
            .await
    }
}
