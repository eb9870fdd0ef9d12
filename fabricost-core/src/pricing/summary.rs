//! Aggregation across pieces and quote-level formatting.

use serde::Serialize;

use crate::config::{CURRENCY, MINUTES_PER_HOUR};
use crate::model::{Breakdown, Piece};

/// Totals across every calculated piece of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct QuoteSummary {
    /// Sum of `final_price` over calculated pieces.
    pub total_final_price: f64,
    /// Sum of raw `total_hours` over calculated pieces, unrounded.
    pub total_hours: f64,
    /// Number of pieces that contributed.
    pub priced_pieces: usize,
}

impl QuoteSummary {
    /// Total duration as whole hours and minutes.
    pub fn duration(&self) -> HoursMinutes {
        HoursMinutes::from_hours(self.total_hours)
    }
}

/// Sum every piece that carries a breakdown. Uncalculated pieces are skipped.
pub fn summarize<'a, I>(pieces: I) -> QuoteSummary
where
    I: IntoIterator<Item = &'a Piece>,
{
    summarize_breakdowns(pieces.into_iter().filter_map(Piece::result))
}

/// Sum a sequence of breakdowns.
pub fn summarize_breakdowns<'a, I>(breakdowns: I) -> QuoteSummary
where
    I: IntoIterator<Item = &'a Breakdown>,
{
    breakdowns
        .into_iter()
        .fold(QuoteSummary::default(), |mut acc, b| {
            acc.total_final_price += b.final_price;
            acc.total_hours += b.total_hours;
            acc.priced_pieces += 1;
            acc
        })
}

/// A duration rounded to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoursMinutes {
    pub hours: u64,
    pub minutes: u64,
}

impl HoursMinutes {
    /// Round fractional hours to the nearest minute (ties to even) and split.
    ///
    /// Negative and NaN inputs collapse to zero.
    pub fn from_hours(total_hours: f64) -> Self {
        let total_minutes = (total_hours * MINUTES_PER_HOUR).round_ties_even().max(0.0) as u64;
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }
}

impl std::fmt::Display for HoursMinutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h{}min", self.hours, self.minutes)
    }
}

/// Format fractional hours as `"{H}h{M}min"`.
pub fn format_hours(total_hours: f64) -> String {
    HoursMinutes::from_hours(total_hours).to_string()
}

/// Format an amount with two decimals and the currency suffix.
pub fn format_money(amount: f64) -> String {
    format!("{:.2} {}", amount, CURRENCY)
}
