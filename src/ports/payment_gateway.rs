//! Payment gateway port for external charge processing.
//!
//! The settlement orchestrator calls `charge` exactly once per settlement
//! attempt. A retried attempt reuses the same idempotency key, so the
//! gateway must treat repeated keys as the same charge.

use crate::domain::foundation::{Currency, Money, ReservationId, UserId};
use crate::domain::payment::PaymentMethod;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for the external charge authority.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges the member.
    ///
    /// A declined charge is `Ok` with `success == false`; `Err` means the
    /// gateway could not be reached or rejected the request itself.
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeResult, GatewayError>;

    /// Returns money for a cancelled reservation.
    ///
    /// Refunds are currently a status flip on the payment record only; the
    /// default implementation does nothing.
    async fn refund(&self, _request: RefundRequest) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Request to charge a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub amount: Money,
    pub currency: Currency,
    pub method: PaymentMethod,
    pub metadata: ChargeMetadata,
}

/// Context passed through to the gateway with every charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeMetadata {
    pub reservation_id: ReservationId,
    pub member_id: UserId,
    /// Same value on every attempt of one settlement.
    pub idempotency_key: String,
}

/// Outcome of a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeResult {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub error_message: Option<String>,
    pub currency: Currency,
}

impl ChargeResult {
    pub fn approved(transaction_id: impl Into<String>, currency: Currency) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id.into()),
            error_message: None,
            currency,
        }
    }

    pub fn declined(error_message: impl Into<String>, currency: Currency) -> Self {
        Self {
            success: false,
            transaction_id: None,
            error_message: Some(error_message.into()),
            currency,
        }
    }
}

/// Request to refund a settled charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub reservation_id: ReservationId,
    pub transaction_id: Option<String>,
    pub amount: Money,
    pub currency: Currency,
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Gateway unreachable or timed out.
    NetworkError,
    /// Credentials rejected.
    AuthenticationError,
    /// Request malformed (unsupported currency, bad amount).
    InvalidRequest,
    /// Gateway-side failure.
    ProviderError,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::InvalidRequest => "invalid_request",
            GatewayErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

/// Failure talking to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidRequest, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}
