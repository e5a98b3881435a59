//! Concurrent booking and settlement.
//!
//! Many tasks race for the same space; exactly one may win each window and
//! no reservation may ever be paid twice.

mod common;

use std::sync::Arc;

use common::{at, World};
use cowork_booking::application::{CreateReservationCommand, SettlePaymentCommand};
use cowork_booking::domain::foundation::{BookingError, Currency, Money, SpaceId};
use cowork_booking::domain::payment::PaymentMethod;
use cowork_booking::domain::reservation::ReservationStatus;
use cowork_booking::domain::space::Space;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn identical_requests_book_the_window_once() {
    let world = World::new();
    let mut tasks = Vec::new();

    for i in 0..8 {
        let create = Arc::clone(&world.create);
        let principal = world.add_member(&format!("member{}@example.com", i));
        let space_id = world.space.id;
        tasks.push(tokio::spawn(async move {
            create
                .handle(
                    &principal,
                    CreateReservationCommand {
                        space_id,
                        start: at(9, 0),
                        end: at(11, 0),
                    },
                )
                .await
        }));
    }

    let mut won = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => won += 1,
            Err(err) => assert!(matches!(err, BookingError::Conflict { .. }), "unexpected error: {err}"),
        }
    }

    assert_eq!(won, 1);
    assert_eq!(world.store.reservations().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn partially_overlapping_requests_never_double_book() {
    let world = World::new();
    let windows = [(9, 11), (10, 12), (8, 10), (10, 11)];
    let mut tasks = Vec::new();

    for (start, end) in windows {
        let create = Arc::clone(&world.create);
        let principal = world.member_principal();
        let space_id = world.space.id;
        tasks.push(tokio::spawn(async move {
            create
                .handle(
                    &principal,
                    CreateReservationCommand {
                        space_id,
                        start: at(start, 0),
                        end: at(end, 0),
                    },
                )
                .await
        }));
    }
    for task in tasks {
        let _ = task.await.unwrap();
    }

    let booked = world.store.reservations();
    assert!(!booked.is_empty());
    for (i, a) in booked.iter().enumerate() {
        for b in booked.iter().skip(i + 1) {
            assert!(!a.window.overlaps(&b.window), "{} overlaps {}", a.window, b.window);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_spaces_book_independently() {
    let world = World::new();
    let spaces: Vec<Space> = (0..4)
        .map(|i| Space::new(SpaceId::new(), format!("Desk {}", i), Money::from_major(8, 0), 1).unwrap())
        .collect();
    for space in &spaces {
        world.store.add_space(space.clone());
    }

    let mut tasks = Vec::new();
    for space in &spaces {
        let create = Arc::clone(&world.create);
        let principal = world.member_principal();
        let space_id = space.id;
        tasks.push(tokio::spawn(async move {
            create
                .handle(
                    &principal,
                    CreateReservationCommand {
                        space_id,
                        start: at(9, 0),
                        end: at(10, 0),
                    },
                )
                .await
        }));
    }

    for task in tasks {
        let reservation = task.await.unwrap().unwrap();
        assert_eq!(reservation.total_price, Money::from_major(8, 0));
    }
    assert_eq!(world.store.reservations().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_settlements_charge_one_payment() {
    let world = World::new();
    let reservation = world.reserve(at(9, 0), at(11, 0)).await.unwrap();
    let mut tasks = Vec::new();

    for _ in 0..4 {
        let settle = Arc::clone(&world.settle);
        let principal = world.member_principal();
        let cmd = SettlePaymentCommand {
            reservation_id: reservation.id,
            amount: reservation.total_price,
            currency: Currency::usd(),
            method: PaymentMethod::DebitCard,
        };
        tasks.push(tokio::spawn(async move { settle.settle(&principal, cmd).await }));
    }

    let mut settled = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => settled += 1,
            Err(err) => assert!(
                matches!(err, BookingError::InvalidTransition { .. } | BookingError::Conflict { .. }),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(settled, 1);
    assert_eq!(world.store.payments().len(), 1);
    assert_eq!(world.store.invoices().len(), 1);
    assert_eq!(world.store.reservation(&reservation.id).unwrap().status, ReservationStatus::Confirmed);
}
