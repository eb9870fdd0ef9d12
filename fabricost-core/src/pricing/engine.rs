//! Single-piece price computation.
//!
//! Pure and total over non-negative inputs: no validation, no rounding, no
//! side effects. Laser and 3D share the formula; the mode only decides
//! whether the gram term applies, and laser rule sets carry an unreachable
//! threshold.

use crate::config::Mode;
use crate::model::{Breakdown, PieceInputs, RuleSet};

/// Price one piece under `rules`.
pub fn price(inputs: &PieceInputs, rules: &RuleSet, mode: Mode) -> Breakdown {
    let total_hours = inputs.total_hours();

    let gram_cost = if mode.uses_weight() {
        inputs.weight_grams * rules.gram_price
    } else {
        0.0
    };

    // Strictly greater: a job exactly at the threshold stays on the normal rate.
    let tier_exceeded = total_hours > rules.exceed_threshold_hours;
    let hour_price = if tier_exceeded {
        rules.exceed_hour_price
    } else {
        rules.normal_hour_price
    };
    let time_cost = total_hours * hour_price;

    let subtotal = gram_cost + time_cost;
    let markup_amount = subtotal * rules.markup_percent / 100.0;
    let final_price = subtotal + markup_amount;

    Breakdown {
        total_hours,
        gram_cost,
        time_cost,
        tier_exceeded,
        subtotal,
        markup_amount,
        final_price,
    }
}
