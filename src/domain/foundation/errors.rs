//! Error types for the domain layer.
//!
//! `BookingError` is the single taxonomy every core operation returns.
//! Each variant maps to a stable [`ErrorCode`] so outer layers can translate
//! errors without string matching.
//!
//! | Error | Code | Retryable |
//! |-------|------|-----------|
//! | NotFound | `NOT_FOUND` | no |
//! | Conflict | `CONFLICT` | no |
//! | InvalidTransition | `INVALID_TRANSITION` | no |
//! | GatewayRejected | `GATEWAY_REJECTED` | no |
//! | Unauthorized | `UNAUTHORIZED` | no |
//! | Validation | `VALIDATION_FAILED` | no |
//! | Transient | `TRANSIENT` | yes |
//! | Internal | `INTERNAL_ERROR` | no |

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Stable error codes, one per error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    Conflict,
    InvalidTransition,
    GatewayRejected,
    Unauthorized,
    ValidationFailed,
    Transient,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::GatewayRejected => "GATEWAY_REJECTED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::Transient => "TRANSIENT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Why a transient failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientReason {
    /// The storage engine aborted the transaction to preserve serializability.
    SerializationFailure,
    /// The transaction did not finish within its time budget.
    Timeout,
    /// Storage was unreachable or the pool was exhausted.
    Unavailable,
}

impl fmt::Display for TransientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransientReason::SerializationFailure => "serialization failure",
            TransientReason::Timeout => "timeout",
            TransientReason::Unavailable => "storage unavailable",
        };
        write!(f, "{}", s)
    }
}

/// Errors returned by reservation and settlement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("{entity} {id} was not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    InvalidTransition { message: String },

    #[error("Payment was declined: {message}")]
    GatewayRejected { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Temporary failure ({reason}), please retry: {message}")]
    Transient {
        reason: TransientReason,
        message: String,
    },

    #[error("An internal error occurred")]
    Internal,
}

impl BookingError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        BookingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        BookingError::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        BookingError::InvalidTransition {
            message: message.into(),
        }
    }

    pub fn gateway_rejected(message: impl Into<String>) -> Self {
        BookingError::GatewayRejected {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        BookingError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BookingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn transient(reason: TransientReason, message: impl Into<String>) -> Self {
        BookingError::Transient {
            reason,
            message: message.into(),
        }
    }

    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::NotFound { .. } => ErrorCode::NotFound,
            BookingError::Conflict { .. } => ErrorCode::Conflict,
            BookingError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            BookingError::GatewayRejected { .. } => ErrorCode::GatewayRejected,
            BookingError::Unauthorized { .. } => ErrorCode::Unauthorized,
            BookingError::Validation { .. } => ErrorCode::ValidationFailed,
            BookingError::Transient { .. } => ErrorCode::Transient,
            BookingError::Internal => ErrorCode::InternalError,
        }
    }

    /// Only transient failures may be retried by the transaction runner.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Transient { .. })
    }

    /// True for a transient failure caused by a serialization conflict.
    pub fn is_serialization_failure(&self) -> bool {
        matches!(
            self,
            BookingError::Transient {
                reason: TransientReason::SerializationFailure,
                ..
            }
        )
    }
}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        BookingError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("currency");
        assert_eq!(format!("{}", err), "Field 'currency' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("capacity", 1, 500, 0);
        assert_eq!(
            format!("{}", err),
            "Field 'capacity' must be between 1 and 500, got 0"
        );
    }

    #[test]
    fn validation_error_converts_to_booking_error_with_field() {
        let err: BookingError = ValidationError::invalid_format("currency", "expected 3 letters").into();
        match err {
            BookingError::Validation { field, message } => {
                assert_eq!(field, "currency");
                assert!(message.contains("expected 3 letters"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn every_kind_has_a_stable_code() {
        assert_eq!(BookingError::not_found("Reservation", "r-1").code().to_string(), "NOT_FOUND");
        assert_eq!(BookingError::conflict("x").code().to_string(), "CONFLICT");
        assert_eq!(BookingError::invalid_transition("x").code().to_string(), "INVALID_TRANSITION");
        assert_eq!(BookingError::gateway_rejected("x").code().to_string(), "GATEWAY_REJECTED");
        assert_eq!(BookingError::unauthorized("x").code().to_string(), "UNAUTHORIZED");
        assert_eq!(BookingError::validation("f", "x").code().to_string(), "VALIDATION_FAILED");
        assert_eq!(
            BookingError::transient(TransientReason::Timeout, "x").code().to_string(),
            "TRANSIENT"
        );
        assert_eq!(BookingError::Internal.code().to_string(), "INTERNAL_ERROR");
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(BookingError::transient(TransientReason::Unavailable, "db down").is_retryable());
        assert!(!BookingError::conflict("overlap").is_retryable());
        assert!(!BookingError::Internal.is_retryable());
    }

    #[test]
    fn serialization_failure_is_distinguished_from_timeout() {
        assert!(BookingError::transient(TransientReason::SerializationFailure, "x")
            .is_serialization_failure());
        assert!(!BookingError::transient(TransientReason::Timeout, "x").is_serialization_failure());
    }

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = BookingError::not_found("Space", "abc");
        assert_eq!(err.to_string(), "Space abc was not found");
    }

    #[test]
    fn internal_error_does_not_leak_details() {
        assert_eq!(BookingError::Internal.to_string(), "An internal error occurred");
    }
}
