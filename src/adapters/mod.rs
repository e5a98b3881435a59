//! Adapters - Implementations of port interfaces.
//!
//! - `clock` - System and fixed clocks
//! - `gateway` - Mock payment gateway
//! - `memory` - In-memory booking store with optimistic validation
//! - `notifications` - Logging and recording notification dispatchers
//! - `postgres` - PostgreSQL booking store

pub mod clock;
pub mod gateway;
pub mod memory;
pub mod notifications;
pub mod postgres;

pub use clock::{FixedClock, SystemClock};
pub use gateway::{GatewayCall, MockPaymentGateway};
pub use memory::InMemoryBookingStore;
pub use notifications::{LoggingNotificationDispatcher, RecordingNotificationDispatcher};
pub use postgres::PostgresBookingStore;
