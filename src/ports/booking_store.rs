//! Booking store port - transactional persistence for the reservation core.
//!
//! Every core operation runs against an explicit [`BookingTransaction`]
//! handle obtained from [`BookingStore::begin`]. There is no ambient
//! session: whatever is read or written goes through the handle, and
//! nothing is visible to other transactions until `commit`.
//!
//! # Isolation
//!
//! Create-reservation and settlement begin at [`IsolationLevel::Serializable`]
//! so that two transactions cannot both observe "no conflict" for
//! overlapping windows on the same space. Implementations must either
//! detect the write skew at commit (returning
//! [`StoreErrorKind::SerializationFailure`]) or lock the space up front.
//!
//! # Example
//!
//! ```ignore
//! let mut tx = store.begin(IsolationLevel::Serializable).await?;
//! let space = tx.find_space(&space_id).await?.ok_or(...)?;
//! if tx.find_active_overlapping(&space_id, &window).await?.is_empty() {
//!     tx.insert_reservation(&reservation).await?;
//! }
//! tx.commit().await?;
//! ```

use crate::domain::foundation::{PaymentId, ReservationId, SpaceId, UserId};
use crate::domain::payment::{Invoice, Payment};
use crate::domain::reservation::{Reservation, TimeWindow};
use crate::domain::space::{Space, SpaceStatus};
use crate::domain::user::User;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Transaction isolation requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    /// Single-row updates (check-in, check-out, cancel).
    ReadCommitted,
    /// Conflict-check-and-insert and settlement.
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsolationLevel::ReadCommitted => write!(f, "READ COMMITTED"),
            IsolationLevel::Serializable => write!(f, "SERIALIZABLE"),
        }
    }
}

/// Category of a persistence failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Aborted to preserve serializability (or deadlock victim).
    SerializationFailure,
    /// Unique or exclusion constraint rejected the write.
    ConstraintViolation,
    /// Storage unreachable, pool exhausted or connection lost.
    Unavailable,
    /// Row expected by an update was missing.
    MissingRow,
    /// Stored data could not be mapped back to domain types.
    Corrupt,
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreErrorKind::SerializationFailure => "serialization failure",
            StoreErrorKind::ConstraintViolation => "constraint violation",
            StoreErrorKind::Unavailable => "storage unavailable",
            StoreErrorKind::MissingRow => "missing row",
            StoreErrorKind::Corrupt => "corrupt row",
            StoreErrorKind::Other => "storage error",
        };
        write!(f, "{}", s)
    }
}

/// Error returned by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn serialization_failure(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::SerializationFailure, message)
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::ConstraintViolation, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    pub fn missing_row(entity: &str, id: impl fmt::Display) -> Self {
        Self::new(StoreErrorKind::MissingRow, format!("{} {} does not exist", entity, id))
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Corrupt, message)
    }
}

/// Factory for transactions.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn begin(&self, isolation: IsolationLevel) -> Result<Box<dyn BookingTransaction>, StoreError>;
}

/// An open transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) rolls it
/// back.
#[async_trait]
pub trait BookingTransaction: Send {
    /// Loads a space and locks it against concurrent writers for the rest of
    /// the transaction.
    async fn find_space(&mut self, id: &SpaceId) -> Result<Option<Space>, StoreError>;

    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// Loads a reservation and locks it like [`find_space`](Self::find_space).
    async fn find_reservation(&mut self, id: &ReservationId) -> Result<Option<Reservation>, StoreError>;

    /// Non-cancelled reservations on `space_id` overlapping `window`.
    async fn find_active_overlapping(
        &mut self,
        space_id: &SpaceId,
        window: &TimeWindow,
    ) -> Result<Vec<Reservation>, StoreError>;

    async fn list_reservations_for_member(&mut self, member_id: &UserId) -> Result<Vec<Reservation>, StoreError>;

    async fn insert_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError>;

    async fn update_reservation(&mut self, reservation: &Reservation) -> Result<(), StoreError>;

    async fn update_space_status(&mut self, id: &SpaceId, status: SpaceStatus) -> Result<(), StoreError>;

    async fn find_payment(&mut self, id: &PaymentId) -> Result<Option<Payment>, StoreError>;

    async fn find_payment_for_reservation(
        &mut self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Payment>, StoreError>;

    async fn insert_payment(&mut self, payment: &Payment) -> Result<(), StoreError>;

    async fn update_payment(&mut self, payment: &Payment) -> Result<(), StoreError>;

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError>;

    async fn find_invoice_for_payment(&mut self, payment_id: &PaymentId) -> Result<Option<Invoice>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
