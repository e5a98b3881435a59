//! User account record.

use crate::domain::foundation::{UserId, ValidationError};
use serde::{Deserialize, Serialize};

use super::UserRole;

/// A registered user. Registration and credentials live outside this crate;
/// the booking core only needs identity, contact address and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
}

impl User {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        role: UserRole,
    ) -> Result<Self, ValidationError> {
        let email = email.into();
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        Ok(Self {
            id,
            email,
            display_name: display_name.into(),
            role,
        })
    }

    /// Convenience constructor for a member account.
    pub fn member(
        id: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(id, email, display_name, UserRole::Member)
    }
}
