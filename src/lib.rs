//! Cowork Booking - reservation lifecycle and payment settlement for shared
//! coworking spaces.
//!
//! Members reserve a space for a half-open time window, pay for it, check in
//! and check out. Every state change runs inside a database transaction so
//! that concurrent requests can never double-book a space or leave a payment
//! without its invoice.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
