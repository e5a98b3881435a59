//! CheckOutHandler - completes a stay and frees the space.

use std::sync::Arc;

use crate::application::{ReservationLifecycle, TransactionRunner};
use crate::domain::foundation::{BookingError, ReservationId};
use crate::domain::reservation::Reservation;
use crate::domain::user::Principal;
use crate::ports::{Clock, IsolationLevel};

pub struct CheckOutHandler {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
    clock: Arc<dyn Clock>,
}

impl CheckOutHandler {
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
            .run("check_out", IsolationLevel::ReadCommitted, move |mut tx| async move {
                let reservation = lifecycle.check_out(tx.as_mut(), principal, id, now).await?;
                tx.commit().await?;
                Ok(reservation)
            })
            .await
    }
}
