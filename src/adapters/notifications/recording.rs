//! In-memory dispatcher for testing.
//!
//! Captures every notification it is asked to deliver so tests can assert
//! on order and content, and can be switched into a failing mode to prove
//! that delivery failures never leak into the operation that triggered
//! them.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::adapters::SystemClock;
use crate::domain::foundation::UserId;
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::payment::Payment;
use crate::domain::reservation::Reservation;
use crate::ports::{Clock, DispatchError, NotificationDispatcher};

/// Recording notification dispatcher.
///
/// # Example
///
/// ```ignore
/// let notifications = Arc::new(RecordingNotificationDispatcher::new());
/// settle.handle(cmd).await?;
/// assert_eq!(
///     notifications.kinds(),
///     vec![NotificationKind::PaymentSuccess, NotificationKind::BookingConfirmation]
/// );
/// ```
pub struct RecordingNotificationDispatcher {
    clock: Arc<dyn Clock>,
    sent: RwLock<Vec<Notification>>,
    failing: RwLock<Option<String>>,
}

impl RecordingNotificationDispatcher {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sent: RwLock::new(Vec::new()),
            failing: RwLock::new(None),
        }
    }

    /// A dispatcher whose every delivery fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let dispatcher = Self::new();
        dispatcher.fail_with(reason);
        dispatcher
    }

    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failing.write().unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    // === Test Helpers ===

    /// Notifications delivered so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent().into_iter().map(|n| n.kind).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn sent_to(&self, recipient: &UserId) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| &n.recipient == recipient)
            .collect()
    }

    fn deliver(&self, notification: Notification) -> Result<(), DispatchError> {
        if let Some(reason) = self
            .failing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(DispatchError(reason));
        }
        self.sent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}

impl Default for RecordingNotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotificationDispatcher {
    async fn notify_booking_confirmed(
        &self,
        _recipient: &UserId,
        reservation: &Reservation,
    ) -> Result<(), DispatchError> {
        self.deliver(Notification::booking_confirmed(reservation, self.clock.now()))
    }

    async fn notify_payment_succeeded(
        &self,
        _recipient: &UserId,
        payment: &Payment,
    ) -> Result<(), DispatchError> {
        self.deliver(Notification::payment_succeeded(payment, self.clock.now()))
    }

    async fn notify_cancelled(
        &self,
        _recipient: &UserId,
        reservation: &Reservation,
    ) -> Result<(), DispatchError> {
        self.deliver(Notification::cancelled(reservation, self.clock.now()))
    }
}
