//! End-to-end reservation scenarios over the in-memory adapters.
//!
//! Covers the happy path from booking to check-out, settlement failure
//! handling, cancellation with refunds and the no-show sweep.

mod common;

use std::time::Duration;

use common::{at, World};
use cowork_booking::application::RetryPolicy;
use cowork_booking::config::BookingConfig;
use cowork_booking::domain::foundation::{BookingError, Money, TransientReason, UserId};
use cowork_booking::domain::notification::NotificationKind;
use cowork_booking::domain::payment::PaymentStatus;
use cowork_booking::domain::reservation::ReservationStatus;
use cowork_booking::domain::space::SpaceStatus;
use cowork_booking::domain::user::Principal;

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn book_pay_check_in_and_check_out() {
    let world = World::new();

    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.total_price, Money::from_major(40, 0));

    let receipt = world.pay(&reservation).await.unwrap();
    assert_eq!(receipt.status, PaymentStatus::Completed);
    assert!(receipt.transaction_id.as_deref().unwrap().starts_with("MOCK-"));

    let invoice = world
        .invoice
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();
    assert_eq!(invoice.subtotal, Money::from_major(40, 0));
    assert_eq!(invoice.tax, Money::from_major(4, 0));
    assert_eq!(invoice.total, Money::from_major(44, 0));
    assert_eq!(invoice.invoice_number, receipt.invoice_number);

    world.clock.set(at(8, 50));
    let checked_in = world
        .check_in
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();
    assert_eq!(checked_in.status, ReservationStatus::CheckedIn);
    assert_eq!(world.store.space(&world.space.id).unwrap().status, SpaceStatus::Occupied);

    world.clock.set(at(10, 30));
    let completed = world
        .check_out
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();
    assert_eq!(completed.status, ReservationStatus::Completed);
    assert_eq!(completed.checked_out_at, Some(at(10, 30)));
    assert_eq!(world.store.space(&world.space.id).unwrap().status, SpaceStatus::Available);

    let view = world
        .get
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();
    assert_eq!(view.status, ReservationStatus::Completed);
    assert_eq!(view.payment_status, PaymentStatus::Completed);
    assert_eq!(view.space_name, "Focus Room");
}

#[tokio::test]
async fn settlement_notifies_payment_then_booking() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();

    world.pay(&reservation).await.unwrap();

    assert_eq!(
        world.notifier.kinds(),
        vec![NotificationKind::PaymentSuccess, NotificationKind::BookingConfirmation]
    );
}

// =============================================================================
// Settlement failures
// =============================================================================

#[tokio::test]
async fn declined_charge_leaves_nothing_behind() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.gateway.decline_next("insufficient funds");

    let err = world.pay(&reservation).await.unwrap_err();

    assert!(matches!(err, BookingError::GatewayRejected { .. }));
    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Pending);
    assert!(world.store.payments().is_empty());
    assert!(world.store.invoices().is_empty());
    assert_eq!(world.notifier.count(), 0);

    // The member can simply try again.
    world.pay(&reservation).await.unwrap();
    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Confirmed);
    assert_eq!(world.store.payments().len(), 1);
    assert_eq!(world.store.invoices().len(), 1);
}

#[tokio::test]
async fn paying_twice_is_rejected_without_a_second_charge() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();

    let err = world.pay(&reservation).await.unwrap_err();

    assert!(matches!(err, BookingError::InvalidTransition { .. }));
    assert_eq!(world.gateway.call_count("charge"), 1);
    assert_eq!(world.store.payments().len(), 1);
}

#[tokio::test]
async fn notification_outage_does_not_undo_settlement() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.notifier.fail_with("smtp relay down");

    world.pay(&reservation).await.unwrap();

    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Confirmed);
    assert_eq!(world.store.invoices().len(), 1);
}

#[tokio::test]
async fn slow_gateway_times_out_and_rolls_back() {
    let world = World::with(RetryPolicy::none(), Duration::from_millis(50));
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.gateway.set_latency(Duration::from_millis(300));

    let err = world.pay(&reservation).await.unwrap_err();

    assert!(matches!(
        err,
        BookingError::Transient {
            reason: TransientReason::Timeout,
            ..
        }
    ));
    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Pending);
    assert!(world.store.payments().is_empty());
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn cancelling_a_paid_reservation_refunds_it() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();

    let cancellation = world
        .cancel
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();

    assert_eq!(cancellation.reservation.status, ReservationStatus::Cancelled);
    let refunded = cancellation.refunded_payment.unwrap();
    assert_eq!(refunded.status, PaymentStatus::Refunded);

    let refunds = world.gateway.refunds();
    assert_eq!(refunds.len(), 1);
    assert_eq!(refunds[0].amount, Money::from_major(40, 0));
    assert_eq!(
        world.notifier.kinds().last(),
        Some(&NotificationKind::Cancellation)
    );

    // The window is free again.
    world.reserve(at(9, 0), at(11, 0)).await.unwrap();
}

#[tokio::test]
async fn cancelling_while_checked_in_frees_the_space() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();
    world.clock.set(at(9, 5));
    world
        .check_in
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();

    world
        .cancel
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();

    assert_eq!(world.store.space(&world.space.id).unwrap().status, SpaceStatus::Available);
}

#[tokio::test]
async fn completed_reservations_cannot_be_cancelled() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();
    world.clock.set(at(9, 0));
    world.check_in.handle(&world.member_principal(), reservation.id).await.unwrap();
    world.clock.set(at(11, 0));
    world.check_out.handle(&world.member_principal(), reservation.id).await.unwrap();

    let err = world
        .cancel
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InvalidTransition { .. }));
    assert!(world.gateway.refunds().is_empty());
}

#[tokio::test]
async fn strangers_cannot_cancel() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    let stranger = world.add_member("eve@example.com");

    let err = world.cancel.handle(&stranger, reservation.id).await.unwrap_err();

    assert!(matches!(err, BookingError::Unauthorized { .. }));
    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Pending);
}

// =============================================================================
// State machine guards
// =============================================================================

#[tokio::test]
async fn unpaid_reservation_cannot_check_in() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.clock.set(at(9, 0));

    let err = world
        .check_in
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InvalidTransition { .. }));
    assert_eq!(world.store.space(&world.space.id).unwrap().status, SpaceStatus::Available);
}

#[tokio::test]
async fn back_to_back_guest_checks_in_before_previous_checks_out() {
    let world = World::new();
    let first = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    let second = world.reserve(at(11, 0), at(12, 0)).await.unwrap();
    world.pay(&first).await.unwrap();
    world.pay(&second).await.unwrap();

    world.clock.set(at(9, 0));
    world.check_in.handle(&world.member_principal(), first.id).await.unwrap();

    world.clock.set(at(11, 0));
    let checked_in = world
        .check_in
        .handle(&world.member_principal(), second.id)
        .await
        .unwrap();
    assert_eq!(checked_in.status, ReservationStatus::CheckedIn);

    world.clock.set(at(11, 5));
    world.check_out.handle(&world.member_principal(), first.id).await.unwrap();
    assert_eq!(world.store.space(&world.space.id).unwrap().status, SpaceStatus::Occupied);

    world.clock.set(at(12, 0));
    world.check_out.handle(&world.member_principal(), second.id).await.unwrap();
    assert_eq!(world.store.space(&world.space.id).unwrap().status, SpaceStatus::Available);
}

#[tokio::test]
async fn check_in_outside_the_window_is_rejected() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();

    world.clock.set(at(8, 44));
    assert!(world.check_in.handle(&world.member_principal(), reservation.id).await.is_err());

    world.clock.set(at(11, 1));
    assert!(world.check_in.handle(&world.member_principal(), reservation.id).await.is_err());

    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn members_cannot_sweep_their_own_no_show() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();
    world.clock.set(at(11, 30));

    let err = world
        .no_show
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Unauthorized { .. }));
    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn no_show_keeps_the_window_blocked() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();

    world.clock.set(at(11, 30));
    let swept = world
        .no_show
        .handle(&Principal::administrator(UserId::new()), reservation.id)
        .await
        .unwrap();
    assert_eq!(swept.status, ReservationStatus::NoShow);

    let err = world.reserve(at(10, 0), at(12, 0)).await.unwrap_err();
    assert!(matches!(err, BookingError::Conflict { .. }));
}

#[tokio::test]
async fn inverted_window_is_a_validation_error() {
    let world = World::new();

    let err = world.reserve(at(11, 0), at(9, 0)).await.unwrap_err();

    assert!(matches!(err, BookingError::Validation { .. }));
    assert!(world.store.reservations().is_empty());
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn booking_config_drives_grace_and_tax() {
    let config = BookingConfig {
        check_in_grace_minutes: 10,
        tax_rate_basis_points: 800,
        ..BookingConfig::default()
    };
    let world = World::from_config(&config);
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    world.pay(&reservation).await.unwrap();

    let invoice = world
        .invoice
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();
    assert_eq!(invoice.tax, Money::from_cents(320));
    assert_eq!(invoice.total, Money::from_cents(4320));

    world.clock.set(at(11, 5));
    let checked_in = world
        .check_in
        .handle(&world.member_principal(), reservation.id)
        .await
        .unwrap();
    assert_eq!(checked_in.status, ReservationStatus::CheckedIn);
}
