//! Receipt image for a single piece.
//!
//! Software-rendered into an RGB buffer with a built-in 5x7 bitmap font, so
//! no font files are needed at runtime. The font only has uppercase glyphs;
//! lowercase and accented letters are folded onto them.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use tracing::info;

use super::text::PieceLines;
use crate::config::Mode;
use crate::error::Result;
use crate::i18n::Language;
use crate::model::{Piece, RuleSet};

pub const RECEIPT_WIDTH: u32 = 700;
pub const RECEIPT_HEIGHT: u32 = 550;

const HEADER_HEIGHT: u32 = 90;
const LEFT: u32 = 60;
/// Widest a body line may be; the right margin mirrors `LEFT`.
const TEXT_MAX_WIDTH: u32 = RECEIPT_WIDTH - 2 * LEFT;
const FIRST_LINE_Y: u32 = 140;
const LINE_STEP: u32 = 50;

const TITLE_SCALE: u32 = 5;
const TEXT_SCALE: u32 = 3;
const FINAL_SCALE: u32 = 4;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const INDIGO: Rgb<u8> = Rgb([0x4f, 0x46, 0xe5]);
const GRAY: Rgb<u8> = Rgb([0x6b, 0x72, 0x80]);
const GREEN: Rgb<u8> = Rgb([0x10, 0xb9, 0x81]);

/// Default file name offered when saving a receipt.
pub fn receipt_file_name(id: u32) -> String {
    format!("piece_{}_recu.png", id)
}

/// Render the receipt for a calculated piece.
pub fn render_receipt(piece: &Piece, rules: &RuleSet, mode: Mode, lang: Language) -> Result<RgbImage> {
    let lines = PieceLines::new(piece, rules, mode, lang)?;

    let mut img = RgbImage::from_pixel(RECEIPT_WIDTH, RECEIPT_HEIGHT, WHITE);
    fill_rect(&mut img, 0, 0, RECEIPT_WIDTH, HEADER_HEIGHT, INDIGO);

    let title_scale = fit_scale(&lines.title, TITLE_SCALE, TEXT_MAX_WIDTH);
    let title_w = text_width(&lines.title, title_scale);
    let title_x = (RECEIPT_WIDTH.saturating_sub(title_w)) / 2;
    let title_y = (HEADER_HEIGHT - GLYPH_H * title_scale) / 2;
    draw_text(&mut img, title_x, title_y, &lines.title, title_scale, WHITE);

    let mut y = FIRST_LINE_Y;
    draw_line(&mut img, y, &lines.inputs.join("  |  "), TEXT_SCALE, GRAY);
    y += LINE_STEP * 2;

    for line in &lines.costs {
        draw_line(&mut img, y, line, TEXT_SCALE, BLACK);
        y += LINE_STEP;
    }
    y += LINE_STEP;

    draw_line(&mut img, y, &lines.final_price, FINAL_SCALE, GREEN);
    Ok(img)
}

/// Draw a body line at `LEFT`, shrunk until it fits the text column.
fn draw_line(img: &mut RgbImage, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
    let scale = fit_scale(text, scale, TEXT_MAX_WIDTH);
    draw_text(img, LEFT, y, text, scale, color);
}

/// Largest scale up to `preferred` at which `text` is at most `max_width`
/// pixels wide. Never below 1.
fn fit_scale(text: &str, preferred: u32, max_width: u32) -> u32 {
    (1..=preferred)
        .rev()
        .find(|&scale| text_width(text, scale) <= max_width)
        .unwrap_or(1)
}

/// Write a receipt as PNG.
pub fn save_receipt(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    info!("Saved receipt to {}", path.display());
    Ok(())
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x1 = (x0 + w).min(img.width());
    let y1 = (y0 + h).min(img.height());
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, color);
        }
    }
}

/// Pixel width of `text` at `scale`.
fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        0
    } else {
        n * (GLYPH_W + 1) * scale - scale
    }
}

/// Draw `text` with its top-left corner at (x, y). Pixels falling outside
/// the image are clipped.
fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
    let mut pen_x = x;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                    fill_rect(
                        img,
                        pen_x + col * scale,
                        y + row as u32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
        pen_x += (GLYPH_W + 1) * scale;
        if pen_x >= img.width() {
            break;
        }
    }
}

/// Map a character onto the glyph set.
fn fold(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'À' | 'Â' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'î' | 'ï' | 'Î' | 'Ï' => 'I',
        'ô' | 'ö' | 'Ô' | 'Ö' => 'O',
        'ù' | 'û' | 'ü' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' | 'Ç' => 'C',
        _ => c.to_ascii_uppercase(),
    }
}

/// 5x7 glyph rows, top to bottom, most significant of the low five bits on
/// the left. Unknown characters render as '?'.
fn glyph(c: char) -> [u8; 7] {
    match fold(c) {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0x00; 7],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '|' => [0x04; 7],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '×' => [0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuoteError;
    use crate::model::PieceInputs;
    use crate::pricing::price;
    use tempfile::TempDir;

    fn calculated_3d() -> Piece {
        let inputs = PieceInputs::new(100.0, 2.0, 30.0);
        let mut piece = Piece::new(1, inputs);
        piece.set_result(price(&inputs, &RuleSet::FACTORY_3D, Mode::ThreeD));
        piece
    }

    fn count_color(img: &RgbImage, color: Rgb<u8>, y0: u32, y1: u32) -> usize {
        img.enumerate_pixels()
            .filter(|(_, y, p)| *y >= y0 && *y < y1 && **p == color)
            .count()
    }

    // ==================== render tests ====================

    #[test]
    fn test_receipt_dimensions_and_header() {
        let img = render_receipt(&calculated_3d(), &RuleSet::FACTORY_3D, Mode::ThreeD, Language::En)
            .unwrap();
        assert_eq!(img.dimensions(), (RECEIPT_WIDTH, RECEIPT_HEIGHT));
        assert_eq!(*img.get_pixel(0, 0), INDIGO);
        assert_eq!(*img.get_pixel(RECEIPT_WIDTH - 1, HEADER_HEIGHT - 1), INDIGO);
        assert_eq!(*img.get_pixel(0, HEADER_HEIGHT), WHITE);
        // Title glyphs inside the band.
        assert!(count_color(&img, WHITE, 0, HEADER_HEIGHT) > 0);
    }

    #[test]
    fn test_receipt_line_colors() {
        let img = render_receipt(&calculated_3d(), &RuleSet::FACTORY_3D, Mode::ThreeD, Language::En)
            .unwrap();
        let line_h = GLYPH_H * TEXT_SCALE;
        assert!(count_color(&img, GRAY, FIRST_LINE_Y, FIRST_LINE_Y + line_h) > 0);
        // 3D: inputs, blank, four cost lines, blank, final price.
        let final_y = FIRST_LINE_Y + LINE_STEP * 7;
        assert!(count_color(&img, GREEN, final_y, final_y + GLYPH_H * FINAL_SCALE) > 0);
        assert_eq!(count_color(&img, GREEN, 0, final_y), 0);
    }

    #[test]
    fn test_receipt_requires_result() {
        let piece = Piece::new(1, PieceInputs::new(1.0, 1.0, 0.0));
        let err = render_receipt(&piece, &RuleSet::FACTORY_3D, Mode::ThreeD, Language::En)
            .unwrap_err();
        assert!(matches!(err, QuoteError::NotCalculated));
    }

    #[test]
    fn test_save_receipt_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(receipt_file_name(1));
        let img = render_receipt(&calculated_3d(), &RuleSet::FACTORY_3D, Mode::ThreeD, Language::Fr)
            .unwrap();

        save_receipt(&img, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_long_input_line_stays_inside_margins() {
        let inputs = PieceInputs::new(250.75, 10.0, 45.5);
        let mut piece = Piece::new(1, inputs);
        piece.set_result(price(&inputs, &RuleSet::FACTORY_3D, Mode::ThreeD));
        let lines = PieceLines::new(&piece, &RuleSet::FACTORY_3D, Mode::ThreeD, Language::Fr).unwrap();
        let inputs_line = lines.inputs.join("  |  ");
        assert!(text_width(&inputs_line, TEXT_SCALE) > TEXT_MAX_WIDTH);

        let img = render_receipt(&piece, &RuleSet::FACTORY_3D, Mode::ThreeD, Language::Fr).unwrap();

        let right_edge = LEFT + TEXT_MAX_WIDTH;
        let inked_past_margin = img
            .enumerate_pixels()
            .filter(|(x, y, p)| *y >= HEADER_HEIGHT && *x >= right_edge && **p != WHITE)
            .count();
        assert_eq!(inked_past_margin, 0);
        // The last character of the line is drawn, not clipped.
        let scale = fit_scale(&inputs_line, TEXT_SCALE, TEXT_MAX_WIDTH);
        let last_x = LEFT + text_width(&inputs_line, scale) - 1;
        let line_h = GLYPH_H * scale;
        assert!((FIRST_LINE_Y..FIRST_LINE_Y + line_h).any(|y| *img.get_pixel(last_x, y) == GRAY));
    }

    #[test]
    fn test_fit_scale() {
        assert_eq!(fit_scale("ABC", 3, 1000), 3);
        assert_eq!(fit_scale("ABCDEFGHIJ", 3, 100), 1);
        assert_eq!(fit_scale("ABCDEFGHIJ", 3, 118), 2);
        assert_eq!(fit_scale(&"W".repeat(500), 3, 100), 1);
    }

    // ==================== font tests ====================

    #[test]
    fn test_fold_accents_and_case() {
        assert_eq!(fold('è'), 'E');
        assert_eq!(fold('ç'), 'C');
        assert_eq!(fold('a'), 'A');
        assert_eq!(fold('7'), '7');
    }

    #[test]
    fn test_unknown_glyph_is_question_mark() {
        assert_eq!(glyph('€'), glyph('?'));
        assert_eq!(glyph('p'), glyph('P'));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 3), 0);
        assert_eq!(text_width("A", 3), 15);
        assert_eq!(text_width("AB", 1), 11);
    }

    #[test]
    fn test_receipt_file_name() {
        assert_eq!(receipt_file_name(4), "piece_4_recu.png");
    }
}
