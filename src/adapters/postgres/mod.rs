//! PostgreSQL adapters.

mod booking_store;

pub use booking_store::PostgresBookingStore;
