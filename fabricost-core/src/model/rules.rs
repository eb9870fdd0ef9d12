//! Pricing rule sets and their factory presets.

use serde::{Deserialize, Serialize};

use crate::config::{Mode, LASER_THRESHOLD_HOURS};

/// Pricing coefficients for one calculator mode.
///
/// Laser rule sets keep the same shape: no gram price, a single hourly rate
/// and an unreachable tier threshold, so one formula prices both modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Currency per gram.
    pub gram_price: f64,
    /// Currency per hour at or below the threshold.
    pub normal_hour_price: f64,
    /// Currency per hour once the duration exceeds the threshold.
    pub exceed_hour_price: f64,
    /// Tier boundary in hours.
    pub exceed_threshold_hours: f64,
    /// Percentage applied to the subtotal.
    pub markup_percent: f64,
}

impl RuleSet {
    /// Factory defaults for 3D printing.
    pub const FACTORY_3D: RuleSet = RuleSet {
        gram_price: 0.1,
        normal_hour_price: 3.0,
        exceed_hour_price: 2.0,
        exceed_threshold_hours: 10.0,
        markup_percent: 20.0,
    };

    /// Factory defaults for laser cutting.
    pub const FACTORY_LASER: RuleSet = RuleSet::laser(30.0, 5.0);

    /// Build a laser rule set from its two meaningful coefficients.
    pub const fn laser(hour_price: f64, markup_percent: f64) -> Self {
        Self {
            gram_price: 0.0,
            normal_hour_price: hour_price,
            exceed_hour_price: hour_price,
            exceed_threshold_hours: LASER_THRESHOLD_HOURS,
            markup_percent,
        }
    }

    /// Factory defaults for `mode`.
    pub fn factory(mode: Mode) -> Self {
        match mode {
            Mode::ThreeD => Self::FACTORY_3D,
            Mode::Laser => Self::FACTORY_LASER,
        }
    }

    /// Coerce this rule set into the shape `mode` requires.
    ///
    /// For laser, only the normal hour price and markup survive.
    pub fn for_mode(self, mode: Mode) -> Self {
        match mode {
            Mode::ThreeD => self,
            Mode::Laser => Self::laser(self.normal_hour_price, self.markup_percent),
        }
    }

    /// Field names paired with their values, in display order.
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("gram_price", self.gram_price),
            ("normal_hour_price", self.normal_hour_price),
            ("exceed_hour_price", self.exceed_hour_price),
            ("exceed_threshold", self.exceed_threshold_hours),
            ("markup_percent", self.markup_percent),
        ]
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::FACTORY_3D
    }
}
