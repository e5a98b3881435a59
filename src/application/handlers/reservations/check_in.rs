//! CheckInHandler - starts a confirmed stay.

use std::sync::Arc;

use crate::application::{ReservationLifecycle, TransactionRunner};
use crate::domain::foundation::{BookingError, ReservationId};
use crate::domain::reservation::Reservation;
use crate::domain::user::Principal;
use crate::ports::{Clock, IsolationLevel};

/// Handler for checking in.
///
/// Reservation and space status change in one transaction.
pub struct CheckInHandler {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
    clock: Arc<dyn Clock>,
}

impl CheckInHandler {
    pub fn new(runner: TransactionRunner, lifecycle: ReservationLifecycle, clock: Arc<dyn Clock>) -> Self {
        Self {
            runner,
            lifecycle,
            clock,
        }
    }

    #[tracing::instrument(skip(self, principal), fields(actor = %principal.user_id))]
    pub async fn handle(&self, principal: &Principal, reservation_id: ReservationId) -> Result<Reservation, BookingError> {
        let now = self.clock.now();
        let lifecycle = &self.lifecycle;
        let id = &reservation_id;

        self.runner
            .run("check_in", IsolationLevel::ReadCommitted, move |mut tx| async move {
                let reservation = lifecycle.check_in(tx.as_mut(), principal, id, now).await?;
                tx.commit().await?;
                Ok(reservation)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{at, Harness};
    use crate::domain::reservation::ReservationStatus;
    use crate::domain::space::SpaceStatus;

    #[tokio::test]
    async fn pending_reservation_cannot_check_in() {
        let h = Harness::new();
        let reservation = h.pending(at(9, 0), at(11, 0)).await;
        h.clock.set(at(9, 0));

        let err = h
            .check_in_handler()
            .handle(&h.member_principal(), reservation.id)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::InvalidTransition { .. }));
        assert_eq!(h.store.space(&h.space.id).unwrap().status, SpaceStatus::Available);
    }

    #[tokio::test]
    async fn too_early_is_rejected() {
        let h = Harness::new();
        let reservation = h.confirmed(at(9, 0), at(11, 0)).await;
        h.clock.set(at(8, 40));

        let err = h
            .check_in_handler()
            .handle(&h.member_principal(), reservation.id)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("too early"));
    }

    #[tokio::test]
    async fn expired_is_rejected() {
        let h = Harness::new();
        let reservation = h.confirmed(at(9, 0), at(11, 0)).await;
        h.clock.set(at(11, 5));

        let err = h
            .check_in_handler()
            .handle(&h.member_principal(), reservation.id)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("expired"));
    }

    #[tokio::test]
    async fn check_in_occupies_space() {
        let h = Harness::new();
        let reservation = h.confirmed(at(9, 0), at(11, 0)).await;
        h.clock.set(at(8, 50));

        let checked_in = h
            .check_in_handler()
            .handle(&h.member_principal(), reservation.id)
            .await
            .unwrap();

        assert_eq!(checked_in.status, ReservationStatus::CheckedIn);
        assert_eq!(checked_in.checked_in_at, Some(at(8, 50)));
        assert_eq!(h.store.space(&h.space.id).unwrap().status, SpaceStatus::Occupied);
    }

    #[tokio::test]
    async fn unknown_reservation_is_not_found() {
        let h = Harness::new();
        let err = h
            .check_in_handler()
            .handle(&h.member_principal(), ReservationId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound { entity: "Reservation", .. }));
    }
}
