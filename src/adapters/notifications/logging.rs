//! Dispatcher that writes notifications to the log.
//!
//! Used where no delivery transport is wired up; the notification is built
//! exactly as it would be delivered and emitted at `info`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::SystemClock;
use crate::domain::foundation::UserId;
use crate::domain::notification::Notification;
use crate::domain::payment::Payment;
use crate::domain::reservation::Reservation;
use crate::ports::{Clock, DispatchError, NotificationDispatcher};

pub struct LoggingNotificationDispatcher {
    clock: Arc<dyn Clock>,
}

impl LoggingNotificationDispatcher {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn emit(&self, recipient: &UserId, notification: Notification) {
        tracing::info!(
            notification_id = %notification.id,
            recipient = %recipient,
            kind = ?notification.kind,
            channel = ?notification.channel,
            title = %notification.title,
            "{}",
            notification.message
        );
    }
}

impl Default for LoggingNotificationDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl NotificationDispatcher for LoggingNotificationDispatcher {
    async fn notify_booking_confirmed(
        &self,
        recipient: &UserId,
        reservation: &Reservation,
    ) -> Result<(), DispatchError> {
        self.emit(recipient, Notification::booking_confirmed(reservation, self.clock.now()));
        Ok(())
    }

    async fn notify_payment_succeeded(
        &self,
        recipient: &UserId,
        payment: &Payment,
    ) -> Result<(), DispatchError> {
        self.emit(recipient, Notification::payment_succeeded(payment, self.clock.now()));
        Ok(())
    }

    async fn notify_cancelled(
        &self,
        recipient: &UserId,
        reservation: &Reservation,
    ) -> Result<(), DispatchError> {
        self.emit(recipient, Notification::cancelled(reservation, self.clock.now()));
        Ok(())
    }
}
