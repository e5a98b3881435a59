//! Command and query handlers.
//!
//! Each handler reads "now" from the clock, runs its work through the
//! [`TransactionRunner`](crate::application::TransactionRunner) and returns
//! domain results or a [`BookingError`](crate::domain::foundation::BookingError).

pub mod payments;
pub mod reservations;

pub use payments::GetInvoiceHandler;
pub use reservations::{
    CancelReservationHandler, CheckInHandler, CheckOutHandler, CreateReservationCommand,
    CreateReservationHandler, GetReservationHandler, ListMemberReservationsHandler, MarkNoShowHandler,
    ReservationView,
};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::adapters::{FixedClock, InMemoryBookingStore, MockPaymentGateway, RecordingNotificationDispatcher};
    use crate::application::{
        ReservationLifecycle, RetryPolicy, SettlePaymentCommand, SettlementOrchestrator, TransactionRunner,
    };
    use crate::domain::foundation::{Currency, Money, SpaceId, Timestamp, UserId};
    use crate::domain::payment::PaymentMethod;
    use crate::domain::reservation::Reservation;
    use crate::domain::space::Space;
    use crate::domain::user::{Principal, User};

    pub fn at(h: u32, m: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap())
    }

    /// In-memory wiring shared by handler tests.
    pub struct Harness {
        pub store: InMemoryBookingStore,
        pub gateway: MockPaymentGateway,
        pub notifier: Arc<RecordingNotificationDispatcher>,
        pub clock: Arc<FixedClock>,
        pub space: Space,
        pub member: User,
        pub lifecycle: ReservationLifecycle,
    }

    impl Harness {
        pub fn new() -> Self {
            let store = InMemoryBookingStore::new();
            let space = Space::new(SpaceId::new(), "Focus Room", Money::from_major(20, 0), 4).unwrap();
            let member = User::member(UserId::new(), "ana@example.com", "Ana").unwrap();
            store.add_space(space.clone());
            store.add_user(member.clone());
            let clock = Arc::new(FixedClock::new(at(7, 0)));

            Self {
                store,
                gateway: MockPaymentGateway::new(),
                notifier: Arc::new(RecordingNotificationDispatcher::with_clock(clock.clone())),
                clock,
                space,
                member,
                lifecycle: ReservationLifecycle::default(),
            }
        }

        pub fn member_principal(&self) -> Principal {
            Principal::member(self.member.id)
        }

        pub fn runner(&self) -> TransactionRunner {
            TransactionRunner::new(
                Arc::new(self.store.clone()),
                RetryPolicy {
                    max_retries: 2,
                    initial_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(4),
                    multiplier: 2.0,
                },
                Duration::from_secs(1),
            )
        }

        pub fn create_handler(&self) -> CreateReservationHandler {
            CreateReservationHandler::new(self.runner(), self.lifecycle, self.clock.clone())
        }

        pub fn check_in_handler(&self) -> CheckInHandler {
            CheckInHandler::new(self.runner(), self.lifecycle, self.clock.clone())
        }

        pub fn check_out_handler(&self) -> CheckOutHandler {
            CheckOutHandler::new(self.runner(), self.lifecycle, self.clock.clone())
        }

        pub fn cancel_handler(&self) -> CancelReservationHandler {
            CancelReservationHandler::new(
                self.runner(),
                self.lifecycle,
                Arc::new(self.gateway.clone()),
                self.notifier.clone(),
                self.clock.clone(),
            )
        }

        pub fn no_show_handler(&self) -> MarkNoShowHandler {
            MarkNoShowHandler::new(self.runner(), self.lifecycle, self.clock.clone())
        }

        pub fn get_handler(&self) -> GetReservationHandler {
            GetReservationHandler::new(self.runner(), self.lifecycle)
        }

        pub fn list_handler(&self) -> ListMemberReservationsHandler {
            ListMemberReservationsHandler::new(self.runner())
        }

        pub fn invoice_handler(&self) -> GetInvoiceHandler {
            GetInvoiceHandler::new(self.runner(), self.lifecycle)
        }

        pub fn settlement(&self) -> SettlementOrchestrator {
            SettlementOrchestrator::new(
                self.runner(),
                self.lifecycle,
                Arc::new(self.gateway.clone()),
                self.notifier.clone(),
                self.clock.clone(),
                1000,
            )
        }

        pub async fn pending(&self, start: Timestamp, end: Timestamp) -> Reservation {
            self.create_handler()
                .handle(
                    &self.member_principal(),
                    CreateReservationCommand {
                        space_id: self.space.id,
                        start,
                        end,
                    },
                )
                .await
                .unwrap()
        }

        pub async fn confirmed(&self, start: Timestamp, end: Timestamp) -> Reservation {
            let reservation = self.pending(start, end).await;
            self.settlement()
                .settle(
                    &self.member_principal(),
                    SettlePaymentCommand {
                        reservation_id: reservation.id,
                        amount: reservation.total_price,
                        currency: Currency::usd(),
                        method: PaymentMethod::CreditCard,
                    },
                )
                .await
                .unwrap();
            self.store.reservation(&reservation.id).unwrap()
        }
    }
}
