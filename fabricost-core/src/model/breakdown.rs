//! Itemized price of one piece.

use serde::Serialize;

use super::RuleSet;

/// Computed price breakdown for a single piece.
///
/// Values are stored unrounded; rounding to two decimals happens only when
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    /// Combined duration in hours.
    pub total_hours: f64,
    /// Weight term (always 0 in laser mode).
    pub gram_cost: f64,
    /// Duration term at the selected tier rate.
    pub time_cost: f64,
    /// Whether the duration exceeded the tier threshold.
    pub tier_exceeded: bool,
    /// `gram_cost + time_cost`.
    pub subtotal: f64,
    /// `subtotal * markup_percent / 100`.
    pub markup_amount: f64,
    /// `subtotal + markup_amount`.
    pub final_price: f64,
}

impl Breakdown {
    /// The hourly rate that produced `time_cost` under `rules`.
    pub fn hourly_rate(&self, rules: &RuleSet) -> f64 {
        if self.tier_exceeded {
            rules.exceed_hour_price
        } else {
            rules.normal_hour_price
        }
    }
}
