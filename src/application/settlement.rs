//! Payment settlement orchestrator.
//!
//! Charges the member, records the payment and its invoice, and confirms
//! the reservation in one serializable transaction. Notifications go out
//! only after commit and can never undo a settlement.

use std::sync::Arc;

use crate::domain::foundation::{BookingError, Currency, InvoiceId, Money, PaymentId, ReservationId, Timestamp};
use crate::domain::payment::{Invoice, Payment, PaymentMethod, PaymentStatus};
use crate::domain::reservation::Reservation;
use crate::domain::user::Principal;
use crate::ports::{
    BookingTransaction, ChargeMetadata, ChargeRequest, Clock, IsolationLevel, NotificationDispatcher, PaymentGateway,
};

use super::{ReservationLifecycle, TransactionRunner};

/// Command to pay for a pending reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlePaymentCommand {
    pub reservation_id: ReservationId,
    pub amount: Money,
    pub currency: Currency,
    pub method: PaymentMethod,
}

/// What the caller gets back from a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReceipt {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub settled_at: Timestamp,
    pub invoice_number: String,
}

/// Settlement orchestrator.
pub struct SettlementOrchestrator {
    runner: TransactionRunner,
    lifecycle: ReservationLifecycle,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn NotificationDispatcher>,
    clock: Arc<dyn Clock>,
    tax_rate_basis_points: u32,
}

impl SettlementOrchestrator {
    pub fn new(
        runner: TransactionRunner,
        lifecycle: ReservationLifecycle,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationDispatcher>,
        clock: Arc<dyn Clock>,
        tax_rate_basis_points: u32,
    ) -> Self {
        Self {
            runner,
            lifecycle,
            gateway,
            notifier,
            clock,
            tax_rate_basis_points,
        }
    }

    /// Settles a reservation.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the reservation, its space or its member is missing
    /// - `Unauthorized` if `principal` may not act on the reservation
    /// - `InvalidTransition` if it is already paid or cancelled
    /// - `Validation` for a non-positive amount
    /// - `GatewayRejected` if the charge fails; nothing is persisted
    /// - `Transient` once retries are exhausted
    #[tracing::instrument(
        skip(self, principal, cmd),
        fields(reservation_id = %cmd.reservation_id, method = %cmd.method, amount = %cmd.amount)
    )]
    pub async fn settle(
        &self,
        principal: &Principal,
        cmd: SettlePaymentCommand,
    ) -> Result<SettlementReceipt, BookingError> {
        let cmd = &cmd;
        let (reservation, payment, invoice) = self
            .runner
            .run("settle_payment", IsolationLevel::Serializable, move |mut tx| async move {
                let settled = self.settle_in(tx.as_mut(), principal, cmd).await?;
                tx.commit().await?;
                Ok(settled)
            })
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            invoice_number = %invoice.invoice_number,
            invoice_total = %invoice.total,
            "Payment settled"
        );

        self.notify(&reservation, &payment).await;

        Ok(SettlementReceipt {
            payment_id: payment.id,
            status: payment.status,
            transaction_id: payment.transaction_id,
            settled_at: payment.settled_at.unwrap_or_else(|| self.clock.now()),
            invoice_number: invoice.invoice_number,
        })
    }

    async fn settle_in(
        &self,
        tx: &mut dyn BookingTransaction,
        principal: &Principal,
        cmd: &SettlePaymentCommand,
    ) -> Result<(Reservation, Payment, Invoice), BookingError> {
        let now = self.clock.now();

        let mut reservation = self.lifecycle.load(tx, &cmd.reservation_id).await?;
        principal.authorize(&reservation, &reservation.space_id)?;
        reservation.ensure_payable()?;

        let space = tx
            .find_space(&reservation.space_id)
            .await?
            .ok_or_else(|| BookingError::not_found("Space", reservation.space_id))?;
        if tx.find_user(&reservation.member_id).await?.is_none() {
            return Err(BookingError::not_found("User", reservation.member_id));
        }

        if cmd.amount != reservation.total_price {
            tracing::warn!(
                expected = %reservation.total_price,
                received = %cmd.amount,
                "Settlement amount differs from reservation price"
            );
        }

        let mut payment = Payment::new_pending(
            PaymentId::new(),
            reservation.id,
            reservation.member_id,
            cmd.amount,
            cmd.currency.clone(),
            cmd.method,
            now,
        )?;

        let charge = self
            .gateway
            .charge(ChargeRequest {
                amount: cmd.amount,
                currency: cmd.currency.clone(),
                method: cmd.method,
                metadata: ChargeMetadata {
                    reservation_id: reservation.id,
                    member_id: reservation.member_id,
                    idempotency_key: format!("settle-{}", reservation.id),
                },
            })
            .await
            .map_err(|err| {
                tracing::warn!(code = %err.code, error = %err.message, "Payment gateway call failed");
                BookingError::gateway_rejected(err.to_string())
            })?;

        if !charge.success {
            let message = charge
                .error_message
                .unwrap_or_else(|| "Payment was declined".to_string());
            tracing::warn!(reason = %message, "Charge declined");
            return Err(BookingError::gateway_rejected(message));
        }
        let transaction_id = charge.transaction_id.ok_or_else(|| {
            tracing::error!("Gateway approved a charge without a transaction id");
            BookingError::Internal
        })?;

        payment.complete(transaction_id, now)?;
        tx.insert_payment(&payment).await?;

        let invoice = Invoice::derive(
            InvoiceId::new(),
            &payment,
            format!("Reservation for {} ({})", space.name, reservation.window),
            self.tax_rate_basis_points,
            now,
        );
        tx.insert_invoice(&invoice).await?;

        self.lifecycle
            .confirm(tx, &mut reservation, payment.id, now)
            .await?;

        Ok((reservation, payment, invoice))
    }

    /// Best effort: failures are logged and dropped.
    async fn notify(&self, reservation: &Reservation, payment: &Payment) {
        if let Err(err) = self
            .notifier
            .notify_payment_succeeded(&payment.member_id, payment)
            .await
        {
            tracing::warn!(payment_id = %payment.id, error = %err, "Payment notification failed");
        }
        if let Err(err) = self
            .notifier
            .notify_booking_confirmed(&reservation.member_id, reservation)
            .await
        {
            tracing::warn!(reservation_id = %reservation.id, error = %err, "Booking confirmation failed");
        }
    }
}
