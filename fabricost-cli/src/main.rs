//! fabricost - CLI tool to price 3D print and laser cut pieces.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fabricost_core::generator::{
    clipboard_text, generate_detailed_pdf, generate_simple_pdf, receipt_file_name,
    render_receipt, save_receipt, summary_line,
};
use fabricost_core::{
    quote, validate_rules, Language, Mode, Piece, PieceForm, PieceInputs, QuoteSession,
    QuoteSummary, RuleSet, Settings, SettingsStore,
};

/// Price 3D printed and laser cut pieces, and export quotes.
#[derive(Parser, Debug)]
#[command(name = "fabricost")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Calculator mode: 3d or laser
    #[arg(short, long, default_value = "3d")]
    mode: Mode,

    /// Piece as WEIGHT:HOURS:MINUTES (laser: HOURS:MINUTES). Repeatable.
    #[arg(short, long = "piece", value_name = "W:H:M")]
    pieces: Vec<String>,

    /// JSON file holding an array of {weight_grams, hours, minutes}
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the price per gram
    #[arg(long)]
    gram_price: Option<f64>,

    /// Override the hourly price up to the threshold
    #[arg(long)]
    normal_hour_price: Option<f64>,

    /// Override the hourly price past the threshold
    #[arg(long)]
    exceed_hour_price: Option<f64>,

    /// Override the tier threshold, in hours
    #[arg(long)]
    threshold: Option<f64>,

    /// Override the markup percentage
    #[arg(long)]
    markup: Option<f64>,

    /// Settings database (defaults to the per-user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Ignore saved settings and use factory rules
    #[arg(long, conflicts_with = "settings")]
    no_settings: bool,

    /// Store the effective rules as the new defaults for this mode
    #[arg(long, conflicts_with = "no_settings")]
    save_rules: bool,

    /// Reset this mode's saved rules to factory values before pricing
    #[arg(long)]
    restore_defaults: bool,

    /// Output language: fr or en
    #[arg(short, long)]
    lang: Option<Language>,

    /// Write a detailed PDF quote
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Write a prices-only PDF quote
    #[arg(long)]
    simple_pdf: Option<PathBuf>,

    /// Write one receipt PNG per piece into this directory
    #[arg(long)]
    receipts: Option<PathBuf>,

    /// Print the quote as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Machine-readable quote.
#[derive(Serialize)]
struct Report<'a> {
    mode: Mode,
    rules: &'a RuleSet,
    pieces: &'a [Piece],
    summary: QuoteSummary,
    duration: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging on stderr so stdout stays clean for --json
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = args.mode;

    // Saved settings
    let mut store = if args.no_settings {
        None
    } else {
        let path = args.settings.clone().unwrap_or_else(SettingsStore::default_path);
        Some(
            SettingsStore::open(&path)
                .with_context(|| format!("Failed to open settings {}", path.display()))?,
        )
    };
    let mut settings = match &store {
        Some(store) => store.load().context("Failed to load settings")?,
        None => Settings::factory(),
    };

    if args.restore_defaults {
        settings.restore_defaults(mode);
        info!("Restored factory {} rules", mode);
    }
    if let Some(lang) = args.lang {
        settings.language = lang;
    }
    let lang = settings.language;

    let rules = apply_overrides(settings.rules_for(mode), mode, &args);
    validate_rules(&rules)?;

    if args.save_rules || args.restore_defaults {
        settings.set_rules_for(mode, rules);
        if let Some(store) = store.as_mut() {
            store.save(&settings).context("Failed to save settings")?;
            info!("Saved settings to {}", store.path().display());
        }
    }

    // Collect pieces
    let mut inputs = Vec::new();
    if let Some(path) = &args.input {
        inputs.extend(read_piece_file(path)?);
    }
    for arg in &args.pieces {
        inputs.push(parse_piece_arg(arg, mode)?);
    }

    if inputs.is_empty() {
        if args.save_rules || args.restore_defaults {
            return Ok(());
        }
        bail!("No pieces given; use --piece or --input");
    }

    info!("Pricing {} {} piece(s)", inputs.len(), mode);
    let session = quote(mode, rules, &inputs)?;

    if args.json {
        print_json(&session)?;
    } else {
        print_text(&session, lang)?;
    }

    write_outputs(&session, lang, &args)?;

    Ok(())
}

/// Apply command-line rule overrides on top of the saved rules.
fn apply_overrides(mut rules: RuleSet, mode: Mode, args: &Args) -> RuleSet {
    if let Some(v) = args.normal_hour_price {
        rules.normal_hour_price = v;
    }
    if let Some(v) = args.markup {
        rules.markup_percent = v;
    }

    let tier_overrides = [
        ("--gram-price", args.gram_price),
        ("--exceed-hour-price", args.exceed_hour_price),
        ("--threshold", args.threshold),
    ];
    match mode {
        Mode::ThreeD => {
            if let Some(v) = args.gram_price {
                rules.gram_price = v;
            }
            if let Some(v) = args.exceed_hour_price {
                rules.exceed_hour_price = v;
            }
            if let Some(v) = args.threshold {
                rules.exceed_threshold_hours = v;
            }
        }
        Mode::Laser => {
            for (flag, _) in tier_overrides.iter().filter(|(_, v)| v.is_some()) {
                warn!("{} has no effect in laser mode", flag);
            }
        }
    }

    rules.for_mode(mode)
}

/// Parse a `WEIGHT:HOURS:MINUTES` piece. Laser pieces may omit the weight.
///
/// Blank fields follow the input form: one blank duration counts as zero.
fn parse_piece_arg(arg: &str, mode: Mode) -> Result<PieceInputs> {
    let parts: Vec<&str> = arg.split(':').collect();
    let form = match (mode, parts.as_slice()) {
        (_, [weight, hours, minutes]) => PieceForm::new(*weight, *hours, *minutes),
        (Mode::Laser, [hours, minutes]) => PieceForm::new("", *hours, *minutes),
        _ => bail!(
            "Invalid piece '{}': expected {}",
            arg,
            if mode.uses_weight() {
                "WEIGHT:HOURS:MINUTES"
            } else {
                "HOURS:MINUTES"
            }
        ),
    };
    form.parse(mode)
        .with_context(|| format!("Invalid piece '{}'", arg))
}

fn read_piece_file(path: &Path) -> Result<Vec<PieceInputs>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let pieces: Vec<PieceInputs> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!("Read {} piece(s) from {}", pieces.len(), path.display());
    Ok(pieces)
}

fn print_text(session: &QuoteSession, lang: Language) -> Result<()> {
    for piece in session.pieces() {
        println!(
            "{}\n",
            clipboard_text(piece, session.rules(), session.mode(), lang)?
        );
    }
    println!("{}", summary_line(&session.summary(), lang));
    Ok(())
}

fn print_json(session: &QuoteSession) -> Result<()> {
    let summary = session.summary();
    let report = Report {
        mode: session.mode(),
        rules: session.rules(),
        pieces: session.pieces(),
        summary,
        duration: summary.duration().to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn write_outputs(session: &QuoteSession, lang: Language, args: &Args) -> Result<()> {
    if let Some(path) = &args.pdf {
        let bytes = generate_detailed_pdf(session, lang)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Generated: {}", path.display());
    }

    if let Some(path) = &args.simple_pdf {
        let bytes = generate_simple_pdf(session, lang)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Generated: {}", path.display());
    }

    if let Some(dir) = &args.receipts {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for piece in session.pieces() {
            let img = render_receipt(piece, session.rules(), session.mode(), lang)?;
            let path = dir.join(receipt_file_name(piece.id));
            save_receipt(&img, &path)?;
        }
    }

    Ok(())
}
