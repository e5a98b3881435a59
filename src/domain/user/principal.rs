//! Caller principal and reservation authorization.
//!
//! The outer request layer authenticates the caller and hands the core a
//! `Principal`. Every mutating operation authorizes against it before
//! touching any state.

use crate::domain::foundation::{BookingError, OwnedByUser, SpaceId, UserId};

use super::{ManagerProfile, UserRole};

/// Role of the caller together with the attributes that role needs for
/// authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalRole {
    Member,
    Manager(ManagerProfile),
    Administrator,
}

/// Authenticated caller of a core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: PrincipalRole,
}

impl Principal {
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            role: PrincipalRole::Member,
        }
    }

    pub fn manager(user_id: UserId, profile: ManagerProfile) -> Self {
        Self {
            user_id,
            role: PrincipalRole::Manager(profile),
        }
    }

    pub fn administrator(user_id: UserId) -> Self {
        Self {
            user_id,
            role: PrincipalRole::Administrator,
        }
    }

    /// The role tag without attributes.
    pub fn role_tag(&self) -> UserRole {
        match self.role {
            PrincipalRole::Member => UserRole::Member,
            PrincipalRole::Manager(_) => UserRole::Manager,
            PrincipalRole::Administrator => UserRole::Administrator,
        }
    }

    /// Authorizes an action on a resource owned by a member and located in
    /// `space_id`.
    ///
    /// Members may act on their own resources only, managers on resources in
    /// spaces they manage, administrators on anything.
    pub fn authorize<R: OwnedByUser>(&self, resource: &R, space_id: &SpaceId) -> Result<(), BookingError> {
        match &self.role {
            PrincipalRole::Member => resource.check_ownership(&self.user_id),
            PrincipalRole::Manager(profile) => {
                if resource.is_owner(&self.user_id) || profile.manages(space_id) {
                    Ok(())
                } else {
                    Err(BookingError::unauthorized(format!(
                        "Manager {} does not manage space {}",
                        self.user_id, space_id
                    )))
                }
            }
            PrincipalRole::Administrator => Ok(()),
        }
    }

    /// Authorizes an action on behalf of `member_id` (e.g. listing their
    /// reservations).
    pub fn authorize_for_member(&self, member_id: &UserId) -> Result<(), BookingError> {
        match &self.role {
            PrincipalRole::Administrator => Ok(()),
            PrincipalRole::Member | PrincipalRole::Manager(_) if &self.user_id == member_id => Ok(()),
            _ => Err(BookingError::unauthorized(format!(
                "User {} may not act for member {}",
                self.user_id, member_id
            ))),
        }
    }

    /// Staff-only operations (the no-show sweep). Members are refused
    /// even on their own reservations.
    pub fn require_staff(&self) -> Result<(), BookingError> {
        match self.role {
            PrincipalRole::Manager(_) | PrincipalRole::Administrator => Ok(()),
            PrincipalRole::Member => Err(BookingError::unauthorized(format!(
                "Member {} may not perform staff operations",
                self.user_id
            ))),
        }
    }
}
