//! GetInvoiceHandler - the invoice issued when a reservation was settled.

use crate::application::{ReservationLifecycle, TransactionRunner};
use crate::domain::foundation::{BookingError, ReservationId};
use crate::domain::payment::Invoice;
use crate::domain::user::Principal;
use crate::ports::IsolationLevel;

pub struct GetInvoiceHandler {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
}

impl GetInvoiceHandler {
    pub fn new(runner: TransactionRunner, lifecycle: ReservationLifecycle) -> Self {
        Self { runner, lifecycle }
    }

    /// # Errors
    ///
    /// `NotFound` when the reservation does not exist or was never paid.
    #[tracing::instrument(skip(self, principal), fields(actor = %principal.user_id))]
    pub async fn handle(&self, principal: &Principal, reservation_id: ReservationId) -> Result<Invoice, BookingError> {
        let lifecycle = &self.lifecycle;
        let id = &reservation_id;

        self.runner
            .run("get_invoice", IsolationLevel::ReadCommitted, move |mut tx| async move {
                let reservation = lifecycle.load(tx.as_mut(), id).await?;
                principal.authorize(&reservation, &reservation.space_id)?;

                let payment = tx
                    .find_payment_for_reservation(id)
                    .await?
                    .ok_or_else(|| BookingError::not_found("Payment", format!("for reservation {}", id)))?;
                let invoice = tx
                    .find_invoice_for_payment(&payment.id)
                    .await?
                    .ok_or_else(|| BookingError::not_found("Invoice", format!("for payment {}", payment.id)))?;

                tx.rollback().await?;
                Ok(invoice)
            })
            .await
    }
}
