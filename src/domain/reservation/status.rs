//! Reservation status state machine.
//!
//! ```text
//! PENDING ──settle──▶ CONFIRMED ──check-in──▶ CHECKED_IN ──check-out──▶ COMPLETED
//!    │                   │   └──sweep──▶ NO_SHOW        │
//!    └──────cancel───────┴────────────▶ CANCELLED ◀─────┘
//! ```

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Created, awaiting payment.
    Pending,
    /// Paid; the space is held for the member.
    Confirmed,
    /// Member is on site.
    CheckedIn,
    /// Member checked out. Terminal.
    Completed,
    /// Cancelled by member or staff. Terminal.
    Cancelled,
    /// Confirmed but never checked in before the window ended. Terminal.
    NoShow,
}

impl ReservationStatus {
    /// Everything except `Cancelled` holds the space for its window.
    pub fn blocks_space(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::CheckedIn => "CHECKED_IN",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::NoShow => "NO_SHOW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(ReservationStatus::Pending),
            "CONFIRMED" => Some(ReservationStatus::Confirmed),
            "CHECKED_IN" => Some(ReservationStatus::CheckedIn),
            "COMPLETED" => Some(ReservationStatus::Completed),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            "NO_SHOW" => Some(ReservationStatus::NoShow),
            _ => None,
        }
    }
}

impl StateMachine for ReservationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (CheckedIn, Completed)
                | (CheckedIn, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ReservationStatus::*;
        match self {
            Pending => vec![Confirmed, Cancelled],
            Confirmed => vec![CheckedIn, Cancelled, NoShow],
            CheckedIn => vec![Completed, Cancelled],
            Completed | Cancelled | NoShow => vec![],
        }
    }
}
