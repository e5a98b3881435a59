//! CreateReservationHandler - books a space for the calling member.

use std::sync::Arc;

use crate::application::{ReservationLifecycle, TransactionRunner};
use crate::domain::foundation::{BookingError, SpaceId, Timestamp};
use crate::domain::reservation::{Reservation, TimeWindow};
use crate::domain::user::Principal;
use crate::ports::{Clock, IsolationLevel};

/// Command to reserve a space for `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReservationCommand {
    pub space_id: SpaceId,
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Handler for creating reservations.
///
/// The conflict check and insert share one serializable transaction.
/// Serialization failures are retried; if contention on the space outlasts
/// the retry budget the caller gets `Conflict`.
pub struct CreateReservationHandler {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
    clock: Arc<dyn Clock>,
}

impl CreateReservationHandler {
    pub fn new(runner: TransactionRunner, lifecycle: ReservationLifecycle, clock: Arc<dyn Clock>) -> Self {
        Self {
            runner,
            lifecycle,
            clock,
        }
    }

    #[tracing::instrument(skip(self, principal), fields(member_id = %principal.user_id))]
    pub async fn handle(
        &self,
        principal: &Principal,
        cmd: CreateReservationCommand,
    ) -> Result<Reservation, BookingError> {
        let window = TimeWindow::new(cmd.start, cmd.end)?;
        let now = self.clock.now();
        let member_id = principal.user_id;
        let lifecycle = &self.lifecycle;
        let space_id = &cmd.space_id;

        self.runner
            .run("create_reservation", IsolationLevel::Serializable, move |mut tx| async move {
                let reservation = lifecycle.create(tx.as_mut(), member_id, space_id, window, now).await?;
                tx.commit().await?;
                Ok(reservation)
            })
            .await
            .map_err(|err| {
                if err.is_serialization_failure() {
                    BookingError::conflict(format!(
                        "Space {} could not be reserved for {} because of concurrent bookings",
                        space_id, window
                    ))
                } else {
                    err
                }
            })
    }
}
