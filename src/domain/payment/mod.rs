//! Payment module - payment records and invoices.

mod aggregate;
mod invoice;
mod method;
mod status;

pub use aggregate::Payment;
pub use invoice::{Invoice, InvoiceItem};
pub use method::PaymentMethod;
pub use status::PaymentStatus;
