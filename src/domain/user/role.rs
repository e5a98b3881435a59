//! User roles and role-specific attribute sets.
//!
//! A user is one record with a closed role tag. Attributes that only make
//! sense for one role live in their own struct and travel with the role,
//! never through inheritance.

use crate::domain::foundation::SpaceId;
use serde::{Deserialize, Serialize};

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Manager,
    Administrator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Manager => "manager",
            UserRole::Administrator => "administrator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "member" => Some(UserRole::Member),
            "manager" => Some(UserRole::Manager),
            "administrator" | "admin" => Some(UserRole::Administrator),
            _ => None,
        }
    }
}

/// Attributes only managers carry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManagerProfile {
    pub managed_space_ids: Vec<SpaceId>,
}

impl ManagerProfile {
    pub fn new(managed_space_ids: Vec<SpaceId>) -> Self {
        Self { managed_space_ids }
    }

    pub fn manages(&self, space_id: &SpaceId) -> bool {
        self.managed_space_ids.contains(space_id)
    }
}
