//! User domain module.
//!
//! - `account` - User record with a role tag
//! - `role` - UserRole and role-specific attribute sets
//! - `principal` - Caller principal and authorization rules

mod account;
mod principal;
mod role;

pub use account::User;
pub use principal::{Principal, PrincipalRole};
pub use role::{ManagerProfile, UserRole};
