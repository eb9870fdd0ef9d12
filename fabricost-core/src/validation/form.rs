//! Form-field parsing for pieces and pricing rules.
//!
//! Every piece-form failure (unparseable text, negative values, missing
//! weight in 3D mode, both duration fields blank) collapses into the single
//! [`QuoteError::InvalidNumbers`] condition.

use crate::config::Mode;
use crate::error::{QuoteError, Result};
use crate::model::{PieceInputs, RuleSet};

/// Parse a non-negative, finite number from form text.
///
/// Surrounding whitespace is ignored. Returns `None` for blank, unparseable,
/// negative, infinite or NaN input.
pub fn parse_number(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Raw text of the add/edit piece form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceForm {
    pub weight: String,
    pub hours: String,
    pub minutes: String,
}

impl PieceForm {
    pub fn new(weight: impl Into<String>, hours: impl Into<String>, minutes: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            hours: hours.into(),
            minutes: minutes.into(),
        }
    }

    /// Prefill the form from existing inputs (editing a piece).
    pub fn from_inputs(inputs: &PieceInputs, mode: Mode) -> Self {
        Self {
            weight: if mode.uses_weight() {
                inputs.weight_grams.to_string()
            } else {
                String::new()
            },
            hours: inputs.hours.to_string(),
            minutes: inputs.minutes.to_string(),
        }
    }

    /// Validate the form for `mode`.
    ///
    /// A single blank duration field counts as 0; both blank is an error.
    /// In laser mode the weight field is ignored and the weight is 0.
    pub fn parse(&self, mode: Mode) -> Result<PieceInputs> {
        let weight_grams = if mode.uses_weight() {
            parse_number(&self.weight).ok_or(QuoteError::InvalidNumbers)?
        } else {
            0.0
        };

        let hours_text = self.hours.trim();
        let minutes_text = self.minutes.trim();
        if hours_text.is_empty() && minutes_text.is_empty() {
            return Err(QuoteError::InvalidNumbers);
        }

        let hours = parse_optional(hours_text)?;
        let minutes = parse_optional(minutes_text)?;

        Ok(PieceInputs::new(weight_grams, hours, minutes))
    }

    pub fn clear(&mut self) {
        self.weight.clear();
        self.hours.clear();
        self.minutes.clear();
    }
}

fn parse_optional(text: &str) -> Result<f64> {
    if text.is_empty() {
        Ok(0.0)
    } else {
        parse_number(text).ok_or(QuoteError::InvalidNumbers)
    }
}

/// Raw text of the pricing rules panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleForm {
    pub gram_price: String,
    pub normal_hour_price: String,
    pub exceed_hour_price: String,
    pub exceed_threshold: String,
    pub markup_percent: String,
}

impl RuleForm {
    /// Prefill the panel from a rule set.
    pub fn from_rules(rules: &RuleSet) -> Self {
        Self {
            gram_price: rules.gram_price.to_string(),
            normal_hour_price: rules.normal_hour_price.to_string(),
            exceed_hour_price: rules.exceed_hour_price.to_string(),
            exceed_threshold: rules.exceed_threshold_hours.to_string(),
            markup_percent: rules.markup_percent.to_string(),
        }
    }

    /// Parse the panel into a rule set shaped for `mode`.
    ///
    /// Laser mode only reads the normal hour price and markup fields.
    pub fn parse(&self, mode: Mode) -> Result<RuleSet> {
        let normal_hour_price = parse_rule("normal_hour_price", &self.normal_hour_price)?;
        let markup_percent = parse_rule("markup_percent", &self.markup_percent)?;

        let rules = match mode {
            Mode::Laser => RuleSet::laser(normal_hour_price, markup_percent),
            Mode::ThreeD => RuleSet {
                gram_price: parse_rule("gram_price", &self.gram_price)?,
                normal_hour_price,
                exceed_hour_price: parse_rule("exceed_hour_price", &self.exceed_hour_price)?,
                exceed_threshold_hours: parse_rule("exceed_threshold", &self.exceed_threshold)?,
                markup_percent,
            },
        };
        Ok(rules)
    }
}

fn parse_rule(field: &str, text: &str) -> Result<f64> {
    parse_number(text).ok_or_else(|| QuoteError::InvalidRule {
        field: field.to_string(),
        value: text.trim().to_string(),
    })
}

/// Check that every coefficient is finite and non-negative.
pub fn validate_rules(rules: &RuleSet) -> Result<()> {
    for (field, value) in rules.fields() {
        if !value.is_finite() || value < 0.0 {
            return Err(QuoteError::InvalidRule {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
