//! Plain-text rendering of calculated pieces.
//!
//! The same labelled lines feed the clipboard text, the terminal output and
//! the receipt image.

use crate::config::{Mode, CURRENCY};
use crate::error::{QuoteError, Result};
use crate::i18n::{tr, tr_fmt, Language, Text};
use crate::model::{Breakdown, Piece, RuleSet};
use crate::pricing::{format_hours, format_money, QuoteSummary};

/// Labelled lines describing one calculated piece.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceLines {
    /// "Piece N".
    pub title: String,
    /// Raw inputs: weight (3D only), then time.
    pub inputs: Vec<String>,
    /// Cost terms, subtotal and markup.
    pub costs: Vec<String>,
    pub final_price: String,
}

impl PieceLines {
    /// Build the lines for `piece`. Fails with `NotCalculated` if the piece
    /// carries no result.
    pub fn new(piece: &Piece, rules: &RuleSet, mode: Mode, lang: Language) -> Result<Self> {
        let b = piece.result().ok_or(QuoteError::NotCalculated)?;

        let mut inputs = Vec::with_capacity(2);
        if mode.uses_weight() {
            inputs.push(format!(
                "{}: {}g",
                tr(lang, Text::Weight),
                format_quantity(piece.inputs.weight_grams)
            ));
        }
        inputs.push(format!("{}: {}", tr(lang, Text::Time), raw_time(piece)));

        let mut costs = Vec::with_capacity(4);
        if mode.uses_weight() {
            costs.push(labelled(lang, Text::GramPrice, b.gram_cost));
        }
        costs.push(labelled(lang, Text::TimePrice, b.time_cost));
        costs.push(labelled(lang, Text::Subtotal, b.subtotal));
        costs.push(format!(
            "{}: {}",
            markup_label(lang, rules),
            format_money(b.markup_amount)
        ));

        Ok(Self {
            title: piece_title(lang, piece.id),
            inputs,
            costs,
            final_price: labelled(lang, Text::FinalPrice, b.final_price),
        })
    }

    /// Multi-line text block: title, inputs, costs, final price.
    pub fn to_clipboard_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for line in &self.inputs {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        for line in &self.costs {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.final_price);
        out
    }
}

/// Clipboard text for one calculated piece.
pub fn clipboard_text(piece: &Piece, rules: &RuleSet, mode: Mode, lang: Language) -> Result<String> {
    Ok(PieceLines::new(piece, rules, mode, lang)?.to_clipboard_text())
}

/// The quote summary line, e.g. `TOTAL: 21.00 DT    TIME: 2h30min`.
pub fn summary_line(summary: &QuoteSummary, lang: Language) -> String {
    tr_fmt(
        lang,
        Text::Summary,
        &[
            ("total", &format_money(summary.total_final_price)),
            ("time", &summary.duration().to_string()),
        ],
    )
}

/// Label/value pairs for a result card, showing the unit rate behind each
/// cost term.
pub fn card_details(
    piece: &Piece,
    b: &Breakdown,
    rules: &RuleSet,
    mode: Mode,
    lang: Language,
) -> Vec<(String, String)> {
    let duration = format_hours(b.total_hours);
    let mut rows = Vec::with_capacity(4);

    if mode.uses_weight() {
        rows.push((
            format!("{}:", tr(lang, Text::GramPrice)),
            format!(
                "{}g × {} {} = {}",
                format_quantity(piece.inputs.weight_grams),
                format_quantity(rules.gram_price),
                CURRENCY,
                format_money(b.gram_cost)
            ),
        ));
    }

    let time_label = if b.tier_exceeded {
        format!("{}{}", tr(lang, Text::TimePrice), tr(lang, Text::ExceededSuffix))
    } else {
        format!("{}:", tr(lang, Text::TimePrice))
    };
    rows.push((
        time_label,
        format!(
            "{} × {} {} = {}",
            duration,
            format_quantity(b.hourly_rate(rules)),
            CURRENCY,
            format_money(b.time_cost)
        ),
    ));
    rows.push((
        format!("{}:", tr(lang, Text::Subtotal)),
        format_money(b.subtotal),
    ));
    rows.push((
        format!("{}:", markup_label(lang, rules)),
        format!("+{}", format_money(b.markup_amount)),
    ));
    rows
}

/// One-line input recap for a result card, e.g.
/// `Weight: 100g  |  Time: 2h 30min (2h30min)`.
pub fn input_recap(piece: &Piece, b: &Breakdown, mode: Mode, lang: Language) -> String {
    let time = format!(
        "{}: {} ({})",
        tr(lang, Text::Time),
        raw_time(piece),
        format_hours(b.total_hours)
    );
    if mode.uses_weight() {
        format!(
            "{}: {}g  |  {}",
            tr(lang, Text::Weight),
            format_quantity(piece.inputs.weight_grams),
            time
        )
    } else {
        time
    }
}

/// "Piece N" in `lang`.
pub fn piece_title(lang: Language, id: u32) -> String {
    format!("{} {}", tr(lang, Text::Piece), id)
}

/// Shortest decimal form of a user-entered quantity (`100`, `2.5`).
pub fn format_quantity(value: f64) -> String {
    value.to_string()
}

/// The time exactly as entered, e.g. `2h 30min`.
pub(crate) fn raw_time(piece: &Piece) -> String {
    format!(
        "{}h {}min",
        format_quantity(piece.inputs.hours),
        format_quantity(piece.inputs.minutes)
    )
}

fn markup_label(lang: Language, rules: &RuleSet) -> String {
    format!("{} (+{:.0}%)", tr(lang, Text::Markup), rules.markup_percent)
}

fn labelled(lang: Language, text: Text, amount: f64) -> String {
    format!("{}: {}", tr(lang, text), format_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PieceInputs;
    use crate::pricing::price;
    use pretty_assertions::assert_eq;

    fn calculated(inputs: PieceInputs, rules: &RuleSet, mode: Mode) -> Piece {
        let mut piece = Piece::new(1, inputs);
        piece.set_result(price(&inputs, rules, mode));
        piece
    }

    // ==================== clipboard text tests ====================

    #[test]
    fn test_clipboard_text_3d() {
        let rules = RuleSet::FACTORY_3D;
        let piece = calculated(PieceInputs::new(100.0, 2.0, 30.0), &rules, Mode::ThreeD);

        let text = clipboard_text(&piece, &rules, Mode::ThreeD, Language::En).unwrap();

        assert_eq!(
            text,
            "Piece 1\n\
             Weight: 100g\n\
             Time: 2h 30min\n\
             \n\
             Gramage Price: 10.00 DT\n\
             Time Price: 7.50 DT\n\
             Subtotal: 17.50 DT\n\
             Markup (+20%): 3.50 DT\n\
             \n\
             Final Price: 21.00 DT"
        );
    }

    #[test]
    fn test_clipboard_text_laser_omits_weight() {
        let rules = RuleSet::FACTORY_LASER;
        let piece = calculated(PieceInputs::time_only(1.0, 30.0), &rules, Mode::Laser);

        let text = clipboard_text(&piece, &rules, Mode::Laser, Language::En).unwrap();

        assert_eq!(
            text,
            "Piece 1\n\
             Time: 1h 30min\n\
             \n\
             Time Price: 45.00 DT\n\
             Subtotal: 45.00 DT\n\
             Markup (+5%): 2.25 DT\n\
             \n\
             Final Price: 47.25 DT"
        );
    }

    #[test]
    fn test_clipboard_text_french_labels() {
        let rules = RuleSet::FACTORY_3D;
        let piece = calculated(PieceInputs::new(100.0, 2.0, 30.0), &rules, Mode::ThreeD);
        let text = clipboard_text(&piece, &rules, Mode::ThreeD, Language::Fr).unwrap();
        assert!(text.starts_with("Pièce 1\nPoids: 100g\n"));
        assert!(text.ends_with("Prix final: 21.00 DT"));
    }

    #[test]
    fn test_clipboard_text_requires_result() {
        let piece = Piece::new(1, PieceInputs::new(1.0, 1.0, 0.0));
        let err = clipboard_text(&piece, &RuleSet::FACTORY_3D, Mode::ThreeD, Language::En)
            .unwrap_err();
        assert!(matches!(err, QuoteError::NotCalculated));
    }

    // ==================== summary / card tests ====================

    #[test]
    fn test_summary_line() {
        let summary = QuoteSummary {
            total_final_price: 21.0,
            total_hours: 2.5,
            priced_pieces: 1,
        };
        assert_eq!(
            summary_line(&summary, Language::En),
            "TOTAL: 21.00 DT    TIME: 2h30min"
        );
    }

    #[test]
    fn test_card_details_show_exceeded_rate() {
        let rules = RuleSet::FACTORY_3D;
        let piece = calculated(PieceInputs::new(0.0, 12.0, 0.0), &rules, Mode::ThreeD);
        let b = *piece.result().unwrap();

        let rows = card_details(&piece, &b, &rules, Mode::ThreeD, Language::En);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].0, "Time Price (exceeded)");
        assert_eq!(rows[1].1, "12h0min × 2 DT = 24.00 DT");
        assert_eq!(rows[3].1, "+4.80 DT");
    }

    #[test]
    fn test_input_recap() {
        let rules = RuleSet::FACTORY_3D;
        let piece = calculated(PieceInputs::new(12.5, 0.0, 90.0), &rules, Mode::ThreeD);
        let b = *piece.result().unwrap();
        assert_eq!(
            input_recap(&piece, &b, Mode::ThreeD, Language::En),
            "Weight: 12.5g  |  Time: 0h 90min (1h30min)"
        );
        assert_eq!(
            input_recap(&piece, &b, Mode::Laser, Language::En),
            "Time: 0h 90min (1h30min)"
        );
    }
}
