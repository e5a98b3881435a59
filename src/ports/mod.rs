//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the reservation core and the outside world. Adapters implement these ports.
//!
//! - `BookingStore` / `BookingTransaction` - transactional persistence
//! - `PaymentGateway` - external charge authority
//! - `NotificationDispatcher` - best-effort member notifications
//! - `Clock` - current time

mod booking_store;
mod clock;
mod notification_dispatcher;
mod payment_gateway;

pub use booking_store::{BookingStore, BookingTransaction, IsolationLevel, StoreError, StoreErrorKind};
pub use clock::Clock;
pub use notification_dispatcher::{DispatchError, NotificationDispatcher};
pub use payment_gateway::{
    ChargeMetadata, ChargeRequest, ChargeResult, GatewayError, GatewayErrorCode, PaymentGateway,
    RefundRequest,
};
