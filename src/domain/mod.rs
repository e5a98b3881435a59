//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, money, time, errors, state machine)
//! - `space` - Bookable spaces and their operational status
//! - `user` - Users, roles and caller principals
//! - `reservation` - Time windows, pricing, conflict checking and reservation lifecycle
//! - `payment` - Payment records and derived invoices
//! - `notification` - Member notifications emitted after commit

pub mod foundation;
pub mod notification;
pub mod payment;
pub mod reservation;
pub mod space;
pub mod user;
