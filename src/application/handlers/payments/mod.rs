//! Payment query handlers. Settlement itself lives in
//! [`SettlementOrchestrator`](crate::application::SettlementOrchestrator).

mod get_invoice;

pub use get_invoice::GetInvoiceHandler;
