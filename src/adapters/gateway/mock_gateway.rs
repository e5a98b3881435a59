//! Mock payment gateway.
//!
//! Stands in for a real charge authority in development and tests.
//! Supports:
//! - Approving charges with `MOCK-XXXXXXXX` transaction ids
//! - Scripted declines and transport errors
//! - Idempotent replays keyed by the charge's idempotency key
//! - Artificial latency (for timeout tests)
//! - Call tracking

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{ChargeRequest, ChargeResult, GatewayError, PaymentGateway, RefundRequest};

/// Mock payment gateway.
///
/// # Example
///
/// ```ignore
/// let gateway = MockPaymentGateway::new();
/// gateway.decline_next("Insufficient funds");
///
/// let err = settle.handle(cmd).await.unwrap_err();
/// assert_eq!(gateway.call_count("charge"), 1);
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Outcomes consumed one per charge, in order.
    scripted: VecDeque<Scripted>,

    /// Decline every charge with this message once the script is empty.
    decline_all: Option<String>,

    /// Successful results by idempotency key.
    settled: HashMap<String, ChargeResult>,

    refunds: Vec<RefundRequest>,

    latency: Option<Duration>,

    call_log: Vec<GatewayCall>,
}

enum Scripted {
    Decline(String),
    Error(GatewayError),
}

/// Recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that declines every charge.
    pub fn declining(message: impl Into<String>) -> Self {
        let gateway = Self::new();
        gateway.state().decline_all = Some(message.into());
        gateway
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration
    // ════════════════════════════════════════════════════════════════════════════

    pub fn decline_next(&self, message: impl Into<String>) {
        self.state().scripted.push_back(Scripted::Decline(message.into()));
    }

    pub fn fail_next(&self, error: GatewayError) {
        self.state().scripted.push_back(Scripted::Error(error));
    }

    /// Delays every call by `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state().call_log.iter().filter(|c| c.method == method).count()
    }

    pub fn refunds(&self) -> Vec<RefundRequest> {
        self.state().refunds.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(GatewayCall {
            method: method.to_string(),
            args,
        });
    }

    async fn simulate_latency(&self) {
        let latency = self.state().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn mock_transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("MOCK-{}", &hex[..8])
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, GatewayError> {
        self.record_call(
            "charge",
            vec![
                request.amount.to_string(),
                request.currency.to_string(),
                request.method.to_string(),
                request.metadata.idempotency_key.clone(),
            ],
        );
        self.simulate_latency().await;

        let mut state = self.state();

        if let Some(previous) = state.settled.get(&request.metadata.idempotency_key) {
            return Ok(previous.clone());
        }

        match state.scripted.pop_front() {
            Some(Scripted::Error(error)) => return Err(error),
            Some(Scripted::Decline(message)) => return Ok(ChargeResult::declined(message, request.currency)),
            None => {}
        }
        if let Some(message) = state.decline_all.clone() {
            return Ok(ChargeResult::declined(message, request.currency));
        }

        let result = ChargeResult::approved(mock_transaction_id(), request.currency);
        state
            .settled
            .insert(request.metadata.idempotency_key, result.clone());
        Ok(result)
    }

    async fn refund(&self, request: RefundRequest) -> Result<(), GatewayError> {
        self.record_call(
            "refund",
            vec![
                request.reservation_id.to_string(),
                request.amount.to_string(),
            ],
        );
        self.state().refunds.push(request);
        Ok(())
    }
}
