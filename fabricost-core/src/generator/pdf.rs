//! PDF quote documents.
//!
//! A small PDF 1.4 writer: A4 pages, the two standard Helvetica faces with
//! WinAnsi encoding, filled and stroked rectangles and single-line text.
//! Content streams are left uncompressed.

use tracing::info;

use super::text::{format_quantity, piece_title, raw_time};
use crate::config::{Mode, APP_NAME, CURRENCY};
use crate::error::Result;
use crate::i18n::{tr, Language, Text};
use crate::model::{Breakdown, Piece, RuleSet};
use crate::pricing::format_money;
use crate::session::QuoteSession;

/// Default file name for the detailed quote.
pub const DETAILED_PDF_FILE: &str = "detailed_quote.pdf";

/// Default file name for the prices-only quote.
pub const SIMPLE_PDF_FILE: &str = "simple_quote.pdf";

const PAGE_W: f64 = 595.28;
const PAGE_H: f64 = 841.89;
const CM: f64 = 72.0 / 2.54;
const MARGIN: f64 = 2.0 * CM;

const LABEL_COL: f64 = 10.0 * CM;
const VALUE_COL: f64 = 6.0 * CM;
const TABLE_W: f64 = LABEL_COL + VALUE_COL;
const TABLE_X: f64 = (PAGE_W - TABLE_W) / 2.0;
const CELL_PAD_X: f64 = 6.0;

const TITLE_SIZE: f64 = 18.0;
const BODY_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Color(u8, u8, u8);

impl Color {
    fn operands(&self) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0
        )
    }
}

const BLACK: Color = Color(0, 0, 0);
const WHITE: Color = Color(255, 255, 255);
const WHITE_SMOKE: Color = Color(245, 245, 245);
const INDIGO: Color = Color(0x4f, 0x46, 0xe5);
const INDIGO_LIGHT: Color = Color(0xe0, 0xe7, 0xff);
const GREEN: Color = Color(0x10, 0xb9, 0x81);
const GREEN_LIGHT: Color = Color(0xec, 0xfd, 0xf5);
const GRAY_LIGHT: Color = Color(0xf9, 0xfa, 0xfb);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// One two-column table row.
#[derive(Debug, Clone)]
struct Row {
    cells: [String; 2],
    font: Font,
    size: f64,
    pad: f64,
    background: Option<Color>,
    color: Color,
}

impl Row {
    fn body(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            cells: [label.into(), value.into()],
            font: Font::Regular,
            size: BODY_SIZE,
            pad: 3.0,
            background: None,
            color: BLACK,
        }
    }

    fn header(label: impl Into<String>, value: impl Into<String>, size: f64) -> Self {
        Self {
            font: Font::Bold,
            size,
            pad: 12.0,
            background: Some(INDIGO),
            color: WHITE_SMOKE,
            ..Self::body(label, value)
        }
    }

    fn height(&self) -> f64 {
        self.size + 2.0 * self.pad
    }
}

struct Table {
    rows: Vec<Row>,
    /// Rows repeated at the top of each continuation page.
    header_rows: usize,
    /// Move the whole table to a new page rather than splitting it.
    keep_together: bool,
    grid: bool,
}

impl Table {
    fn height(&self) -> f64 {
        self.rows.iter().map(Row::height).sum()
    }
}

/// Page-by-page document builder.
struct PdfWriter {
    pages: Vec<String>,
    current: String,
    /// Top of the free area on the current page.
    y: f64,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_H - MARGIN,
        }
    }

    fn remaining(&self) -> f64 {
        self.y - MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_H - MARGIN;
    }

    /// Start a new page unless `height` fits. A fresh page always accepts.
    fn ensure_space(&mut self, height: f64) {
        if height > self.remaining() && !self.current.is_empty() {
            self.new_page();
        }
    }

    fn spacer(&mut self, height: f64) {
        self.y -= height;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.current.push_str(&format!(
            "{} rg\n{:.2} {:.2} {:.2} {:.2} re f\n",
            color.operands(),
            x,
            y,
            w,
            h
        ));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.current.push_str(&format!(
            "{} RG 1 w\n{:.2} {:.2} {:.2} {:.2} re S\n",
            BLACK.operands(),
            x,
            y,
            w,
            h
        ));
    }

    fn text(&mut self, x: f64, baseline: f64, font: Font, size: f64, color: Color, text: &str) {
        self.current.push_str(&format!(
            "BT /{} {} Tf {} rg {:.2} {:.2} Td {} Tj ET\n",
            font.resource(),
            size,
            color.operands(),
            x,
            baseline,
            pdf_string(text)
        ));
    }

    fn title(&mut self, text: &str) {
        let leading = TITLE_SIZE * 1.2;
        self.ensure_space(leading);
        let x = (PAGE_W - text_width(text, TITLE_SIZE, Font::Bold)) / 2.0;
        self.text(x, self.y - TITLE_SIZE, Font::Bold, TITLE_SIZE, BLACK, text);
        self.y -= leading;
    }

    fn paragraph_line(&mut self, text: &str, font: Font) {
        let leading = BODY_SIZE * 1.2;
        self.ensure_space(leading);
        self.text(TABLE_X, self.y - BODY_SIZE, font, BODY_SIZE, BLACK, text);
        self.y -= leading;
    }

    fn draw_row(&mut self, row: &Row, grid: bool) {
        let h = row.height();
        let bottom = self.y - h;

        if let Some(bg) = row.background {
            self.fill_rect(TABLE_X, bottom, TABLE_W, h, bg);
        }

        // Helvetica descends about a fifth of the em below the baseline.
        let baseline = bottom + row.pad + row.size * 0.21;
        self.text(TABLE_X + CELL_PAD_X, baseline, row.font, row.size, row.color, &row.cells[0]);
        if !row.cells[1].is_empty() {
            self.text(
                TABLE_X + LABEL_COL + CELL_PAD_X,
                baseline,
                row.font,
                row.size,
                row.color,
                &row.cells[1],
            );
        }

        if grid {
            self.stroke_rect(TABLE_X, bottom, LABEL_COL, h);
            self.stroke_rect(TABLE_X + LABEL_COL, bottom, VALUE_COL, h);
        }
        self.y = bottom;
    }

    fn draw_table(&mut self, table: &Table) {
        if table.keep_together {
            self.ensure_space(table.height());
        }

        for (i, row) in table.rows.iter().enumerate() {
            if row.height() > self.remaining() && !self.current.is_empty() {
                self.new_page();
                if i >= table.header_rows {
                    for header in &table.rows[..table.header_rows] {
                        self.draw_row(header, table.grid);
                    }
                }
            }
            self.draw_row(row, table.grid);
        }
    }

    fn total_band(&mut self, lang: Language, total: f64) {
        let row = Row {
            font: Font::Bold,
            size: 16.0,
            pad: 15.0,
            background: Some(GREEN),
            color: WHITE_SMOKE,
            ..Row::body(tr(lang, Text::Total), format_money(total))
        };
        self.draw_table(&Table {
            rows: vec![row],
            header_rows: 0,
            keep_together: true,
            grid: false,
        });
    }

    /// Assemble the page streams into a complete PDF file.
    fn finish(mut self, title: &str) -> Vec<u8> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        // Fixed objects: 1 catalog, 2 page tree, 3-4 fonts, 5 info.
        // Each page then takes a page object and a content stream.
        let first_page_obj = 6;
        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
            .collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            ),
            font_object("Helvetica"),
            font_object("Helvetica-Bold"),
            format!(
                "<< /Title {} /Producer {} >>",
                pdf_string(title),
                pdf_string(APP_NAME)
            ),
        ];

        for (i, content) in self.pages.iter().enumerate() {
            let content_obj = first_page_obj + 2 * i + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_W, PAGE_H, content_obj
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f\r\n", objects.len() + 1);
        for offset in &offsets {
            xref.push_str(&format!("{:010} 00000 n\r\n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        out.extend_from_slice(xref.as_bytes());
        out
    }
}

fn font_object(base: &str) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        base
    )
}

/// Encode `text` as a PDF literal string in WinAnsi.
///
/// Latin-1 characters are written as octal escapes; anything WinAnsi cannot
/// represent becomes '?'.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '€' => out.push_str("\\200"),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

/// Approximate Helvetica advance widths, in thousandths of an em.
fn char_width(c: char, font: Font) -> u32 {
    let bold = font == Font::Bold;
    match c {
        ' ' | '.' | ',' => 278,
        ':' | ';' => if bold { 333 } else { 278 },
        '0'..='9' => 556,
        'i' | 'j' | 'l' => if bold { 278 } else { 222 },
        'f' | 't' | 'I' => 278,
        'r' | '(' | ')' | '-' => if bold { 389 } else { 333 },
        'm' => 833,
        'w' => if bold { 778 } else { 722 },
        'M' => 833,
        'W' => 944,
        '%' => 889,
        'A'..='Z' => if bold { 722 } else { 667 },
        'a'..='z' => if bold { 611 } else { 556 },
        _ => 556,
    }
}

fn text_width(text: &str, size: f64, font: Font) -> f64 {
    let units: u32 = text.chars().map(|c| char_width(c, font)).sum();
    units as f64 * size / 1000.0
}

fn quote_title(mode: Mode, lang: Language) -> &'static str {
    match mode {
        Mode::ThreeD => tr(lang, Text::QuoteTitle),
        Mode::Laser => tr(lang, Text::QuoteTitleLaser),
    }
}

/// Lines of the pricing rules paragraph.
fn rule_lines(rules: &RuleSet, mode: Mode, lang: Language) -> Vec<String> {
    let normal = format!(
        "{} {} {}/h",
        tr(lang, Text::RuleNormalHour),
        format_quantity(rules.normal_hour_price),
        CURRENCY
    );
    let markup = format!(
        "{} {}%",
        tr(lang, Text::RuleMarkup),
        format_quantity(rules.markup_percent)
    );

    match mode {
        Mode::Laser => vec![normal, markup],
        Mode::ThreeD => vec![
            format!(
                "{} {} {}/g",
                tr(lang, Text::RuleGramPrice),
                format_quantity(rules.gram_price),
                CURRENCY
            ),
            normal,
            format!(
                "{} {} {}/h ({} {}h)",
                tr(lang, Text::RuleExceedHour),
                format_quantity(rules.exceed_hour_price),
                CURRENCY,
                tr(lang, Text::RuleThreshold),
                format_quantity(rules.exceed_threshold_hours)
            ),
            markup,
        ],
    }
}

fn detailed_table(piece: &Piece, b: &Breakdown, mode: Mode, lang: Language) -> Table {
    let mut rows = vec![
        Row::header(tr(lang, Text::Item), tr(lang, Text::Value), 12.0),
        Row {
            background: Some(INDIGO_LIGHT),
            ..Row::body(piece_title(lang, piece.id), "")
        },
    ];

    if mode.uses_weight() {
        rows.push(Row::body(
            tr(lang, Text::Weight),
            format!("{}g", format_quantity(piece.inputs.weight_grams)),
        ));
    }
    rows.push(Row::body(tr(lang, Text::Time), raw_time(piece)));
    if mode.uses_weight() {
        rows.push(Row::body(tr(lang, Text::GramPrice), format_money(b.gram_cost)));
    }
    rows.push(Row::body(tr(lang, Text::TimePrice), format_money(b.time_cost)));
    rows.push(Row::body(tr(lang, Text::Subtotal), format_money(b.subtotal)));
    rows.push(Row::body(tr(lang, Text::Markup), format_money(b.markup_amount)));
    rows.push(Row {
        font: Font::Bold,
        pad: 12.0,
        background: Some(GREEN_LIGHT),
        ..Row::body(tr(lang, Text::FinalPrice), format_money(b.final_price))
    });

    Table {
        rows,
        header_rows: 1,
        keep_together: true,
        grid: true,
    }
}

fn simple_table(session: &QuoteSession, lang: Language) -> Table {
    let mut rows = vec![Row::header(tr(lang, Text::Piece), tr(lang, Text::FinalPrice), 14.0)];

    let priced = session
        .pieces()
        .iter()
        .filter_map(|p| p.result().map(|b| (p.id, b.final_price)));
    for (i, (id, final_price)) in priced.enumerate() {
        rows.push(Row {
            size: 12.0,
            pad: 10.0,
            background: Some(if i % 2 == 0 { WHITE } else { GRAY_LIGHT }),
            ..Row::body(piece_title(lang, id), format_money(final_price))
        });
    }

    Table {
        rows,
        header_rows: 1,
        keep_together: false,
        grid: true,
    }
}

/// Build the detailed quote: rules summary, one table per calculated piece
/// and the grand total.
pub fn generate_detailed_pdf(session: &QuoteSession, lang: Language) -> Result<Vec<u8>> {
    session.require_results()?;
    let mode = session.mode();
    let title = quote_title(mode, lang);

    let mut pdf = PdfWriter::new();
    pdf.title(title);
    pdf.spacer(0.5 * CM);

    pdf.paragraph_line(tr(lang, Text::PricingRules), Font::Bold);
    for line in rule_lines(session.rules(), mode, lang) {
        pdf.paragraph_line(&line, Font::Regular);
    }
    pdf.spacer(0.8 * CM);

    for piece in session.pieces() {
        if let Some(b) = piece.result() {
            pdf.draw_table(&detailed_table(piece, b, mode, lang));
            pdf.spacer(0.8 * CM);
        }
    }

    let summary = session.summary();
    pdf.total_band(lang, summary.total_final_price);

    let bytes = pdf.finish(title);
    info!(
        "Generated detailed {} quote: {} piece(s), {} bytes",
        mode,
        summary.priced_pieces,
        bytes.len()
    );
    Ok(bytes)
}

/// Build the prices-only quote: one `Piece | Final Price` table and the
/// grand total.
pub fn generate_simple_pdf(session: &QuoteSession, lang: Language) -> Result<Vec<u8>> {
    session.require_results()?;
    let mode = session.mode();
    let title = quote_title(mode, lang);

    let mut pdf = PdfWriter::new();
    pdf.title(title);
    pdf.spacer(CM);
    pdf.draw_table(&simple_table(session, lang));
    pdf.spacer(CM);

    let summary = session.summary();
    pdf.total_band(lang, summary.total_final_price);

    let bytes = pdf.finish(title);
    info!(
        "Generated simple {} quote: {} piece(s), {} bytes",
        mode,
        summary.priced_pieces,
        bytes.len()
    );
    Ok(bytes)
}
