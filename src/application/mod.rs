//! Application layer - lifecycle manager, settlement orchestrator and
//! handlers.
//!
//! Everything here runs inside transactions obtained through
//! [`TransactionRunner`]; the domain layer below stays free of I/O.

pub mod handlers;
mod lifecycle;
mod settlement;
mod transaction;

pub use handlers::{
    CancelReservationHandler, CheckInHandler, CheckOutHandler, CreateReservationCommand,
    CreateReservationHandler, GetInvoiceHandler, GetReservationHandler, ListMemberReservationsHandler,
    MarkNoShowHandler, ReservationView,
};
pub use lifecycle::{Cancellation, ReservationLifecycle};
pub use settlement::{SettlePaymentCommand, SettlementOrchestrator, SettlementReceipt};
pub use transaction::{RetryPolicy, TransactionRunner};
