//! Conflict checker.
//!
//! Pure predicate: has the space already been promised for any part of a
//! candidate window? Callers evaluate it inside the same serializable
//! transaction that inserts the new reservation.

use crate::domain::foundation::SpaceId;

use super::{Reservation, TimeWindow};

/// Returns the first reservation on `space_id` that is not cancelled and
/// overlaps `window`.
pub fn find_conflict<'a, I>(existing: I, space_id: &SpaceId, window: &TimeWindow) -> Option<&'a Reservation>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    existing
        .into_iter()
        .find(|r| &r.space_id == space_id && r.status.blocks_space() && r.window.overlaps(window))
}

/// True when granting `window` on `space_id` would double-book the space.
pub fn has_conflict<'a, I>(existing: I, space_id: &SpaceId, window: &TimeWindow) -> bool
where
    I: IntoIterator<Item = &'a Reservation>,
{
    find_conflict(existing, space_id, window).is_some()
}
