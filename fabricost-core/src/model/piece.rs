//! Piece definition representing a single billable item in the quote.

use serde::{Deserialize, Serialize};

use super::Breakdown;
use crate::config::MINUTES_PER_HOUR;

/// Raw per-piece inputs as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PieceInputs {
    /// Weight in grams. Always 0 for laser pieces.
    #[serde(default)]
    pub weight_grams: f64,
    /// Whole or fractional hours.
    #[serde(default)]
    pub hours: f64,
    /// Whole or fractional minutes.
    #[serde(default)]
    pub minutes: f64,
}

impl PieceInputs {
    /// Create new piece inputs.
    pub fn new(weight_grams: f64, hours: f64, minutes: f64) -> Self {
        Self {
            weight_grams,
            hours,
            minutes,
        }
    }

    /// Create time-only inputs (laser pieces).
    pub fn time_only(hours: f64, minutes: f64) -> Self {
        Self::new(0.0, hours, minutes)
    }

    /// Combined duration in hours.
    pub fn total_hours(&self) -> f64 {
        self.hours + self.minutes / MINUTES_PER_HOUR
    }
}

/// A piece in the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Piece {
    /// 1-based position in the session list.
    pub id: u32,
    /// Raw inputs.
    pub inputs: PieceInputs,
    /// Computed price, absent until calculated.
    result: Option<Breakdown>,
}

impl Piece {
    /// Create a new, uncalculated piece.
    pub fn new(id: u32, inputs: PieceInputs) -> Self {
        Self {
            id,
            inputs,
            result: None,
        }
    }

    /// The computed breakdown, if this piece has been calculated since its last edit.
    pub fn result(&self) -> Option<&Breakdown> {
        self.result.as_ref()
    }

    /// Check if this piece currently carries a breakdown.
    pub fn is_calculated(&self) -> bool {
        self.result.is_some()
    }

    /// Replace the inputs. Any previous result is discarded.
    pub fn set_inputs(&mut self, inputs: PieceInputs) {
        self.inputs = inputs;
        self.result = None;
    }

    /// Attach a freshly computed breakdown.
    pub fn set_result(&mut self, breakdown: Breakdown) {
        self.result = Some(breakdown);
    }

    /// Drop the computed breakdown.
    pub fn clear_result(&mut self) {
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_breakdown() -> Breakdown {
        Breakdown {
            total_hours: 1.0,
            gram_cost: 0.0,
            time_cost: 3.0,
            tier_exceeded: false,
            subtotal: 3.0,
            markup_amount: 0.6,
            final_price: 3.6,
        }
    }

    #[test]
    fn test_total_hours_combines_minutes() {
        let inputs = PieceInputs::new(0.0, 2.0, 30.0);
        assert_eq!(inputs.total_hours(), 2.5);
    }

    #[test]
    fn test_total_hours_minutes_only() {
        let inputs = PieceInputs::time_only(0.0, 90.0);
        assert_eq!(inputs.total_hours(), 1.5);
    }

    #[test]
    fn test_new_piece_is_uncalculated() {
        let piece = Piece::new(1, PieceInputs::default());
        assert!(!piece.is_calculated());
        assert!(piece.result().is_none());
    }

    #[test]
    fn test_set_inputs_clears_result() {
        let mut piece = Piece::new(1, PieceInputs::new(10.0, 1.0, 0.0));
        piece.set_result(sample_breakdown());
        assert!(piece.is_calculated());

        piece.set_inputs(PieceInputs::new(20.0, 1.0, 0.0));
        assert!(!piece.is_calculated());
        assert_eq!(piece.inputs.weight_grams, 20.0);
    }

    #[test]
    fn test_inputs_deserialize_with_missing_fields() {
        let inputs: PieceInputs = serde_json::from_str(r#"{"hours": 3}"#).unwrap();
        assert_eq!(inputs, PieceInputs::new(0.0, 3.0, 0.0));
    }
}
