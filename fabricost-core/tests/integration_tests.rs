//! Integration tests for the quoting pipeline.
//!
//! These tests drive the public API the way the CLI and the desktop app do:
//! form text in, session edits, calculation, then text, image and PDF
//! outputs. Document checks are structural (markers and rendered amounts)
//! rather than byte-for-byte.

use fabricost_core::generator::{
    clipboard_text, generate_detailed_pdf, generate_simple_pdf, render_receipt, save_receipt,
    summary_line, RECEIPT_HEIGHT, RECEIPT_WIDTH,
};
use fabricost_core::{
    quote, ErrorKind, Language, Mode, PieceForm, PieceInputs, QuoteError, QuoteSession, RuleForm,
    RuleSet, Settings, SettingsStore,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ==================== Test Helpers ====================

fn pdf_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Session built from raw form text, as the input page does.
fn session_from_forms(mode: Mode, forms: &[(&str, &str, &str)]) -> QuoteSession {
    let mut session = QuoteSession::with_factory_rules(mode);
    for (w, h, m) in forms {
        let inputs = PieceForm::new(*w, *h, *m).parse(mode).unwrap();
        session.add_piece(inputs);
    }
    session
}

// ==================== Pipeline Tests ====================

#[test]
fn test_single_piece_3d_quote() {
    let mut session = session_from_forms(Mode::ThreeD, &[("100", "2", "30")]);
    let summary = session.calculate_all().unwrap();

    assert_eq!(
        summary_line(&summary, Language::En),
        "TOTAL: 21.00 DT    TIME: 2h30min"
    );
}

#[test]
fn test_laser_quote() {
    let mut session = session_from_forms(Mode::Laser, &[("", "1", "30")]);
    let summary = session.calculate_all().unwrap();

    assert_eq!(
        summary_line(&summary, Language::En),
        "TOTAL: 47.25 DT    TIME: 1h30min"
    );
}

#[test]
fn test_edit_delete_recalculate() {
    let mut session = session_from_forms(
        Mode::ThreeD,
        &[("100", "2", "30"), ("0", "12", ""), ("50", "", "45")],
    );
    session.calculate_all().unwrap();

    session.remove_piece(1).unwrap();
    let ids: Vec<u32> = session.pieces().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let edited = PieceForm::new("100", "2", "30").parse(Mode::ThreeD).unwrap();
    session.update_piece(2, edited).unwrap();

    // Piece 2 no longer counts until recalculated.
    assert_eq!(summary_line(&session.summary(), Language::En), "TOTAL: 28.80 DT    TIME: 12h0min");

    let summary = session.calculate_all().unwrap();
    assert_eq!(
        summary_line(&summary, Language::En),
        "TOTAL: 49.80 DT    TIME: 14h30min"
    );
}

#[test]
fn test_rule_panel_edit_reprices() {
    let mut session = session_from_forms(Mode::ThreeD, &[("100", "2", "30")]);
    session.calculate_all().unwrap();

    let mut panel = RuleForm::from_rules(session.rules());
    panel.markup_percent = "0".to_string();
    session.set_rules(panel.parse(Mode::ThreeD).unwrap());

    assert!(!session.has_results());
    let summary = session.calculate_all().unwrap();
    assert_eq!(format!("{:.2}", summary.total_final_price), "17.50");
}

#[test]
fn test_quote_rejects_bad_inputs() {
    let err = quote(Mode::ThreeD, RuleSet::FACTORY_3D, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let err = quote(
        Mode::ThreeD,
        RuleSet::FACTORY_3D,
        &[PieceInputs::new(-5.0, 1.0, 0.0)],
    )
    .unwrap_err();
    assert!(matches!(err, QuoteError::InvalidNumbers));

    let bad_rules = RuleSet {
        markup_percent: f64::NAN,
        ..RuleSet::FACTORY_3D
    };
    let err = quote(Mode::ThreeD, bad_rules, &[PieceInputs::new(1.0, 1.0, 0.0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

// ==================== Output Tests ====================

#[test]
fn test_clipboard_text_from_pipeline() {
    let session = quote(
        Mode::ThreeD,
        RuleSet::FACTORY_3D,
        &[PieceInputs::new(0.0, 12.0, 0.0)],
    )
    .unwrap();
    let piece = &session.pieces()[0];

    let text = clipboard_text(piece, session.rules(), session.mode(), Language::En).unwrap();

    assert_eq!(
        text,
        "Piece 1\n\
         Weight: 0g\n\
         Time: 12h 0min\n\
         \n\
         Gramage Price: 0.00 DT\n\
         Time Price: 24.00 DT\n\
         Subtotal: 24.00 DT\n\
         Markup (+20%): 4.80 DT\n\
         \n\
         Final Price: 28.80 DT"
    );
}

#[test]
fn test_receipt_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let session = quote(
        Mode::Laser,
        RuleSet::FACTORY_LASER,
        &[PieceInputs::time_only(1.0, 30.0)],
    )
    .unwrap();
    let piece = &session.pieces()[0];

    let img = render_receipt(piece, session.rules(), session.mode(), Language::Fr).unwrap();
    assert_eq!(img.dimensions(), (RECEIPT_WIDTH, RECEIPT_HEIGHT));

    let path = dir.path().join("receipt.png");
    save_receipt(&img, &path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_pdf_totals_match_summary() {
    let session = quote(
        Mode::ThreeD,
        RuleSet::FACTORY_3D,
        &[
            PieceInputs::new(100.0, 2.0, 30.0),
            PieceInputs::new(0.0, 12.0, 0.0),
        ],
    )
    .unwrap();

    let detailed = pdf_text(&generate_detailed_pdf(&session, Language::En).unwrap());
    let simple = pdf_text(&generate_simple_pdf(&session, Language::En).unwrap());

    for doc in [&detailed, &simple] {
        assert!(doc.starts_with("%PDF-"));
        assert!(doc.contains("(TOTAL)"));
        assert!(doc.contains("(49.80 DT)"));
        assert!(doc.trim_end().ends_with("%%EOF"));
    }
    assert!(detailed.contains("(Markup)"));
    assert!(!simple.contains("(Markup)"));
}

#[test]
fn test_pdf_before_calculation_is_precondition_error() {
    let session = session_from_forms(Mode::ThreeD, &[("10", "1", "0")]);
    let err = generate_simple_pdf(&session, Language::Fr).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

// ==================== Settings Tests ====================

#[test]
fn test_settings_feed_new_session() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("settings.db");

    {
        let mut store = SettingsStore::open(&db).unwrap();
        let mut settings = Settings::factory();
        settings.language = Language::En;
        settings.set_rules_for(Mode::Laser, RuleSet::laser(40.0, 10.0));
        store.save(&settings).unwrap();
    }

    let settings = SettingsStore::open(&db).unwrap().load().unwrap();
    let mut session = QuoteSession::new(Mode::Laser, settings.rules_for(Mode::Laser));
    session.add_piece(PieceInputs::time_only(2.0, 0.0));
    let summary = session.calculate_all().unwrap();

    assert_eq!(settings.language, Language::En);
    assert_eq!(
        summary_line(&summary, settings.language),
        "TOTAL: 88.00 DT    TIME: 2h0min"
    );
}
