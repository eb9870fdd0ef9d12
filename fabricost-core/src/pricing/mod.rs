//! Pricing engine: single-piece formula and quote aggregation.

mod engine;
mod summary;

pub use engine::price;
pub use summary::{format_hours, format_money, summarize, summarize_breakdowns, HoursMinutes, QuoteSummary};
