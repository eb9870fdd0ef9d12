//! Configuration constants and the calculator mode.

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Brand name shown in window titles and documents.
pub const APP_NAME: &str = "FabriCost";

/// Currency suffix used in every rendered amount.
pub const CURRENCY: &str = "DT";

/// Tier boundary used by laser rule sets. Large enough that the surcharge
/// tier is never reached by a real job.
pub const LASER_THRESHOLD_HOURS: f64 = 9999.0;

/// Floating-point comparison epsilon.
pub const EPS: f64 = 1e-9;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Calculator mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 3D printing: weight and time are both billed.
    #[default]
    #[serde(rename = "3d")]
    ThreeD,
    /// Laser cutting: time only, single hourly rate.
    Laser,
}

impl Mode {
    /// Whether the gram cost term applies in this mode.
    pub fn uses_weight(&self) -> bool {
        matches!(self, Mode::ThreeD)
    }

    /// Prefix used for this mode's keys in the settings store.
    pub fn settings_prefix(&self) -> &'static str {
        match self {
            Mode::ThreeD => "3d",
            Mode::Laser => "laser",
        }
    }

    /// Parse a mode name (`3d` or `laser`, case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "3d" => Some(Mode::ThreeD),
            "laser" => Some(Mode::Laser),
            _ => None,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::from_name(s).ok_or_else(|| QuoteError::UnknownMode(s.to_string()))
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.settings_prefix())
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal, relative to their magnitude.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS * a.abs().max(b.abs()).max(1.0)
    }
}
