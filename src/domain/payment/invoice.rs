//! Invoice derived from a completed payment.
//!
//! Invoices are computed once, at settlement, from the payment alone and are
//! never mutated afterwards.

use crate::domain::foundation::{Currency, InvoiceId, InvoiceItemId, Money, PaymentId, Timestamp};
use serde::{Deserialize, Serialize};

use super::Payment;

/// Basis points in 100 %.
const FULL_RATE_BASIS_POINTS: u32 = 10_000;

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub payment_id: PaymentId,
    /// Human-facing number, `INV-` followed by ten upper-case hex digits.
    pub invoice_number: String,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub currency: Currency,
    pub issue_date: Timestamp,
    pub due_date: Timestamp,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    /// Derives the invoice for `payment`.
    ///
    /// `tax = round(subtotal × rate)` and `total = round(subtotal × (1 + rate))`,
    /// each rounded half-to-even on its own.
    pub fn derive(
        id: InvoiceId,
        payment: &Payment,
        description: impl Into<String>,
        tax_rate_basis_points: u32,
        issued_at: Timestamp,
    ) -> Self {
        let subtotal = payment.amount;
        let tax = subtotal.apply_basis_points(tax_rate_basis_points);
        let total = subtotal.apply_basis_points(FULL_RATE_BASIS_POINTS + tax_rate_basis_points);

        Self {
            id,
            payment_id: payment.id,
            invoice_number: invoice_number_for(&id),
            subtotal,
            tax,
            total,
            currency: payment.currency.clone(),
            issue_date: issued_at,
            due_date: issued_at,
            items: vec![InvoiceItem {
                id: InvoiceItemId::new(),
                description: description.into(),
                quantity: 1,
                unit_price: subtotal,
                amount: subtotal,
            }],
        }
    }
}

fn invoice_number_for(id: &InvoiceId) -> String {
    let hex = id.as_uuid().simple().to_string().to_ascii_uppercase();
    format!("INV-{}", &hex[..10])
}
