//! Member-facing notifications.
//!
//! The core only builds these and hands them to a dispatcher after commit;
//! delivery is someone else's problem.

use crate::domain::foundation::{NotificationId, Timestamp, UserId};
use crate::domain::payment::Payment;
use crate::domain::reservation::Reservation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingConfirmation,
    PaymentSuccess,
    Cancellation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
}

/// A message addressed to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub channel: NotificationChannel,
    pub sent_at: Timestamp,
}

impl Notification {
    pub fn booking_confirmed(reservation: &Reservation, now: Timestamp) -> Self {
        Self::in_app(
            reservation.member_id,
            NotificationKind::BookingConfirmation,
            "Booking Confirmed",
            format!(
                "Your reservation {} for {} is confirmed.",
                reservation.id, reservation.window
            ),
            now,
        )
    }

    pub fn payment_succeeded(payment: &Payment, now: Timestamp) -> Self {
        Self::in_app(
            payment.member_id,
            NotificationKind::PaymentSuccess,
            "Payment Successful",
            format!(
                "We received your payment of {} {} for reservation {}.",
                payment.amount, payment.currency, payment.reservation_id
            ),
            now,
        )
    }

    pub fn cancelled(reservation: &Reservation, now: Timestamp) -> Self {
        Self::in_app(
            reservation.member_id,
            NotificationKind::Cancellation,
            "Reservation Cancelled",
            format!(
                "Your reservation {} for {} has been cancelled.",
                reservation.id, reservation.window
            ),
            now,
        )
    }

    fn in_app(
        recipient: UserId,
        kind: NotificationKind,
        title: &str,
        message: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind,
            title: title.to_string(),
            message,
            channel: NotificationChannel::InApp,
            sent_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Money, ReservationId, SpaceId};
    use crate::domain::reservation::TimeWindow;
    use crate::domain::space::Space;
    use chrono::{TimeZone, Utc};

    fn reservation() -> Reservation {
        let start = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap());
        let space = Space::new(SpaceId::new(), "Desk 4", Money::from_major(5, 0), 1).unwrap();
        Reservation::create_pending(
            ReservationId::new(),
            &space,
            UserId::new(),
            TimeWindow::new(start, start.plus_hours(1)).unwrap(),
            start,
        )
    }

    #[test]
    fn cancellation_goes_to_the_member_in_app() {
        let r = reservation();
        let n = Notification::cancelled(&r, r.created_at);
        assert_eq!(n.recipient, r.member_id);
        assert_eq!(n.kind, NotificationKind::Cancellation);
        assert_eq!(n.channel, NotificationChannel::InApp);
        assert!(n.message.contains(&r.id.to_string()));
    }

    #[test]
    fn booking_confirmation_names_the_window() {
        let r = reservation();
        let n = Notification::booking_confirmed(&r, r.created_at);
        assert_eq!(n.kind, NotificationKind::BookingConfirmation);
        assert!(n.message.contains(&r.window.to_string()));
    }
}
