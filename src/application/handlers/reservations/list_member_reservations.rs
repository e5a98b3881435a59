//! ListMemberReservationsHandler - a member's reservations, newest first.

use crate::application::TransactionRunner;
use crate::domain::foundation::{BookingError, UserId};
use crate::domain::user::Principal;
use crate::ports::IsolationLevel;

use super::ReservationView;

pub struct ListMemberReservationsHandler {
    runner: TransactionRunner,
}

impl ListMemberReservationsHandler {
    pub fn new(runner: TransactionRunner) -> Self {
        Self { runner }
    }

    /// Lists `member_id`'s reservations ordered by start time, latest first.
    #[tracing::instrument(skip(self, principal), fields(actor = %principal.user_id))]
    pub async fn handle(&self, principal: &Principal, member_id: UserId) -> Result<Vec<ReservationView>, BookingError> {
        principal.authorize_for_member(&member_id)?;

        self.runner
            .run("list_member_reservations", IsolationLevel::ReadCommitted, move |mut tx| async move {
                let mut reservations = tx.list_reservations_for_member(&member_id).await?;
                reservations.sort_by(|a, b| b.window.start().cmp(&a.window.start()));

                let mut views = Vec::with_capacity(reservations.len());
                for reservation in reservations {
                    views.push(ReservationView::load(tx.as_mut(), reservation).await?);
                }
                tx.rollback().await?;
                Ok(views)
            })
            .await
    }
}
