//! Space domain module.
//!
//! - `aggregate` - Space entity with its hourly rate
//! - `status` - SpaceStatus state machine

mod aggregate;
mod status;

pub use aggregate::Space;
pub use status::SpaceStatus;
