//! CancelReservationHandler - cancels a reservation and flags its refund.

use std::sync::Arc;

use crate::application::{Cancellation, ReservationLifecycle, TransactionRunner};
use crate::domain::foundation::{BookingError, ReservationId};
use crate::domain::payment::Payment;
use crate::domain::user::Principal;
use crate::ports::{Clock, IsolationLevel, NotificationDispatcher, PaymentGateway, RefundRequest};

/// Handler for cancelling reservations.
///
/// The status changes (reservation, payment, space) commit together. The
/// gateway refund hook and the cancellation notice run after commit and
/// are best effort.
pub struct CancelReservationHandler {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl CancelReservationHandler {
    pub fn new(
        runner: TransactionRunner,
        lifecycle: ReservationLifecycle,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            runner,
            lifecycle,
            gateway,
            notifier,
            clock,
        }
    }

    #[tracing::instrument(skip(self, principal), fields(actor = %principal.user_id))]
    pub async fn handle(&self, principal: &Principal, reservation_id: ReservationId) -> Result<Cancellation, BookingError> {
        let now = self.clock.now();
        let lifecycle = &self.lifecycle;
        let id = &reservation_id;

        let cancellation = self
            .runner
            .run("cancel_reservation", IsolationLevel::Serializable, move |mut tx| async move {
                let cancellation = lifecycle.cancel(tx.as_mut(), principal, id, now).await?;
                tx.commit().await?;
                Ok(cancellation)
            })
            .await?;

        if let Some(payment) = &cancellation.refunded_payment {
            self.request_refund(payment).await;
        }

        let reservation = &cancellation.reservation;
        if let Err(err) = self
            .notifier
            .notify_cancelled(&reservation.member_id, reservation)
            .await
        {
            tracing::warn!(reservation_id = %reservation.id, error = %err, "Cancellation notice failed");
        }

        Ok(cancellation)
    }

    async fn request_refund(&self, payment: &Payment) {
        let request = RefundRequest {
            reservation_id: payment.reservation_id,
            transaction_id: payment.transaction_id.clone(),
            amount: payment.amount,
            currency: payment.currency.clone(),
        };
        if let Err(err) = self.gateway.refund(request).await {
            tracing::warn!(payment_id = %payment.id, error = %err, "Gateway refund request failed");
        }
    }
}
