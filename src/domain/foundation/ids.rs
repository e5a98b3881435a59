//! Strongly-typed identifier value objects.
//!
//! Every aggregate gets its own UUID newtype so a `SpaceId` can never be
//! passed where a `ReservationId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares a UUID-backed identifier with the usual constructors and
/// `Display`/`FromStr` impls.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a bookable space.
    SpaceId
);

uuid_id!(
    /// Unique identifier for a reservation.
    ReservationId
);

uuid_id!(
    /// Unique identifier for a settled payment.
    PaymentId
);

uuid_id!(
    /// Unique identifier for an invoice.
    InvoiceId
);

uuid_id!(
    /// Unique identifier for a single invoice line.
    InvoiceItemId
);

uuid_id!(
    /// Unique identifier for a notification sent to a user.
    NotificationId
);

uuid_id!(
    /// Unique identifier for a user (member, manager or administrator).
    UserId
);
