//! Validation of user-entered text before it reaches the engine.

mod form;

pub use form::{parse_number, validate_rules, PieceForm, RuleForm};
