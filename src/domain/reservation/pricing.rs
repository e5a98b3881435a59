//! Flat hourly pricing.

use crate::domain::foundation::{div_round_half_even, Money};

use super::TimeWindow;

const MILLIS_PER_HOUR: i128 = 3_600_000;

/// `hourly_rate × hours`, rounded half-to-even to whole cents.
///
/// Computed on milliseconds so fractional hours are exact until the final
/// rounding step.
pub fn price_for(hourly_rate: Money, window: &TimeWindow) -> Money {
    let millis = i128::from(window.duration().num_milliseconds());
    let scaled = i128::from(hourly_rate.cents()) * millis;
    Money::from_cents(div_round_half_even(scaled, MILLIS_PER_HOUR) as i64)
}
