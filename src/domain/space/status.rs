//! Space operational status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Operational status of a space.
///
/// Only the reservation lifecycle moves a space between `Available` and
/// `Occupied`; the maintenance and inactive edges belong to catalog
/// management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceStatus {
    Available,
    Occupied,
    Maintenance,
    Inactive,
}

impl SpaceStatus {
    /// Spaces under maintenance or retired cannot take new reservations.
    pub fn accepts_reservations(&self) -> bool {
        matches!(self, SpaceStatus::Available | SpaceStatus::Occupied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceStatus::Available => "AVAILABLE",
            SpaceStatus::Occupied => "OCCUPIED",
            SpaceStatus::Maintenance => "MAINTENANCE",
            SpaceStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AVAILABLE" => Some(SpaceStatus::Available),
            "OCCUPIED" => Some(SpaceStatus::Occupied),
            "MAINTENANCE" => Some(SpaceStatus::Maintenance),
            "INACTIVE" => Some(SpaceStatus::Inactive),
            _ => None,
        }
    }
}

impl StateMachine for SpaceStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SpaceStatus::*;
        matches!(
            (self, target),
            (Available, Occupied)
                | (Occupied, Available)
                | (Available, Maintenance)
                | (Maintenance, Available)
                | (Available, Inactive)
                | (Maintenance, Inactive)
                | (Inactive, Available)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SpaceStatus::*;
        match self {
            Available => vec![Occupied, Maintenance, Inactive],
            Occupied => vec![Available],
            Maintenance => vec![Available, Inactive],
            Inactive => vec![Available],
        }
    }
}
