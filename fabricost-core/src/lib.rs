//! fabricost-core - Core library for pricing 3D-printed and laser-cut parts.
//!
//! This library provides the pricing engine, the quote session that owns the
//! piece list, persisted settings, and the text, image and PDF outputs used
//! by the `fabricost` CLI and the desktop app.
//!
//! # Example
//!
//! ```
//! use fabricost_core::{quote, Mode, PieceInputs, RuleSet};
//!
//! let session = quote(
//!     Mode::ThreeD,
//!     RuleSet::FACTORY_3D,
//!     &[PieceInputs::new(100.0, 2.0, 30.0)],
//! )
//! .unwrap();
//! let summary = session.summary();
//! assert_eq!(format!("{:.2}", summary.total_final_price), "21.00");
//! assert_eq!(summary.duration().to_string(), "2h30min");
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod model;
pub mod pricing;
pub mod session;
pub mod settings;
pub mod validation;

// Re-exports for convenience
pub use config::Mode;
pub use error::{ErrorKind, QuoteError, Result};
pub use i18n::{tr, tr_fmt, Language, Text};
pub use model::{Breakdown, Piece, PieceInputs, RuleSet};
pub use pricing::{format_hours, format_money, price, summarize, QuoteSummary};
pub use session::QuoteSession;
pub use settings::{Settings, SettingsStore};
pub use validation::{validate_rules, PieceForm, RuleForm};

/// Price a batch of pieces in one go.
///
/// This is the non-interactive pipeline:
/// 1. Validate the rule set
/// 2. Build a session with every piece
/// 3. Calculate all pieces
///
/// The returned session carries every breakdown and can be handed to the
/// generators.
pub fn quote(mode: Mode, rules: RuleSet, inputs: &[PieceInputs]) -> Result<QuoteSession> {
    validate_rules(&rules)?;

    let mut session = QuoteSession::new(mode, rules);
    for piece in inputs {
        if [piece.weight_grams, piece.hours, piece.minutes]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(QuoteError::InvalidNumbers);
        }
        session.add_piece(*piece);
    }

    let summary = session.calculate_all()?;
    tracing::debug!(
        "Quoted {} piece(s): {}",
        summary.priced_pieces,
        format_money(summary.total_final_price)
    );
    Ok(session)
}
