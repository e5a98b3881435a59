//! Shared wiring for integration tests.
//!
//! Builds the full application over the in-memory adapters so scenarios run
//! without a database.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use cowork_booking::adapters::{
    FixedClock, InMemoryBookingStore, MockPaymentGateway, RecordingNotificationDispatcher,
};
use cowork_booking::application::{
    CancelReservationHandler, CheckInHandler, CheckOutHandler, CreateReservationCommand, CreateReservationHandler,
    GetInvoiceHandler, GetReservationHandler, MarkNoShowHandler, ReservationLifecycle, RetryPolicy,
    SettlePaymentCommand, SettlementOrchestrator, SettlementReceipt, TransactionRunner,
};
use cowork_booking::config::BookingConfig;
use cowork_booking::domain::foundation::{BookingError, Currency, Money, SpaceId, Timestamp, UserId};
use cowork_booking::domain::payment::PaymentMethod;
use cowork_booking::domain::reservation::Reservation;
use cowork_booking::domain::space::Space;
use cowork_booking::domain::user::{Principal, User};

pub fn at(h: u32, m: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap())
}

pub fn fast_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 5,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        multiplier: 2.0,
    }
}

/// One coworking site: a store, collaborators and every handler.
pub struct World {
    pub store: InMemoryBookingStore,
    pub gateway: MockPaymentGateway,
    pub notifier: Arc<RecordingNotificationDispatcher>,
    pub clock: Arc<FixedClock>,
    pub space: Space,
    pub member: User,
    pub create: Arc<CreateReservationHandler>,
    pub settle: Arc<SettlementOrchestrator>,
    pub check_in: CheckInHandler,
    pub check_out: CheckOutHandler,
    pub cancel: CancelReservationHandler,
    pub no_show: MarkNoShowHandler,
    pub get: GetReservationHandler,
    pub invoice: GetInvoiceHandler,
}

impl World {
    pub fn new() -> Self {
        Self::with(fast_retries(), Duration::from_secs(2))
    }

    pub fn with(retry: RetryPolicy, timeout: Duration) -> Self {
        Self::build(|store| TransactionRunner::new(store, retry, timeout), ReservationLifecycle::default(), 1000)
    }

    /// Wires everything the way a deployment would from its booking section.
    pub fn from_config(config: &BookingConfig) -> Self {
        Self::build(
            |store| TransactionRunner::from_config(store, config),
            ReservationLifecycle::new(config.check_in_policy()),
            config.tax_rate_basis_points,
        )
    }

    fn build(
        runner: impl FnOnce(Arc<InMemoryBookingStore>) -> TransactionRunner,
        lifecycle: ReservationLifecycle,
        tax_rate_basis_points: u32,
    ) -> Self {
        let store = InMemoryBookingStore::new();
        let space = Space::new(SpaceId::new(), "Focus Room", Money::from_major(20, 0), 4).unwrap();
        let member = User::member(UserId::new(), "ana@example.com", "Ana").unwrap();
        store.add_space(space.clone());
        store.add_user(member.clone());

        let gateway = MockPaymentGateway::new();
        let clock = Arc::new(FixedClock::new(at(7, 0)));
        let notifier = Arc::new(RecordingNotificationDispatcher::with_clock(clock.clone()));
        let runner = runner(Arc::new(store.clone()));

        Self {
            create: Arc::new(CreateReservationHandler::new(runner.clone(), lifecycle, clock.clone())),
            settle: Arc::new(SettlementOrchestrator::new(
                runner.clone(),
                lifecycle,
                Arc::new(gateway.clone()),
                notifier.clone(),
                clock.clone(),
                tax_rate_basis_points,
            )),
            check_in: CheckInHandler::new(runner.clone(), lifecycle, clock.clone()),
            check_out: CheckOutHandler::new(runner.clone(), lifecycle, clock.clone()),
            cancel: CancelReservationHandler::new(
                runner.clone(),
                lifecycle,
                Arc::new(gateway.clone()),
                notifier.clone(),
                clock.clone(),
            ),
            no_show: MarkNoShowHandler::new(runner.clone(), lifecycle, clock.clone()),
            get: GetReservationHandler::new(runner.clone(), lifecycle),
            invoice: GetInvoiceHandler::new(runner, lifecycle),
            store,
            gateway,
            notifier,
            clock,
            space,
            member,
        }
    }

    pub fn member_principal(&self) -> Principal {
        Principal::member(self.member.id)
    }

    /// Registers another member and returns their principal.
    pub fn add_member(&self, email: &str) -> Principal {
        let user = User::member(UserId::new(), email, email).unwrap();
        self.store.add_user(user.clone());
        Principal::member(user.id)
    }

    pub async fn reserve(&self, start: Timestamp, end: Timestamp) -> Result<Reservation, BookingError> {
        self.create
            .handle(
                &self.member_principal(),
                CreateReservationCommand {
                    space_id: self.space.id,
                    start,
                    end,
                },
            )
            .await
    }

    pub async fn pay(&self, reservation: &Reservation) -> Result<SettlementReceipt, BookingError> {
        self.settle
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
    }
}
