//! Data model types for price quoting.

mod breakdown;
mod piece;
mod rules;

pub use breakdown::Breakdown;
pub use piece::{Piece, PieceInputs};
pub use rules::RuleSet;
