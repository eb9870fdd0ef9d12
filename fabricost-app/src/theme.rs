//! Color palette and sizing constants for the calculator UI.
//!
//! Light surfaces with an indigo brand color; green marks money the customer
//! pays (final prices, totals).

use egui::Color32;

// =============================================================================
// SURFACES
// =============================================================================
pub const PAGE_BG: Color32 = Color32::from_rgb(0xf0, 0xf4, 0xf8);
pub const SPLASH_BG: Color32 = Color32::from_rgb(0x11, 0x18, 0x27);
pub const CARD_BG: Color32 = Color32::WHITE;
pub const INPUT_INFO_BG: Color32 = Color32::from_rgb(0xf9, 0xfa, 0xfb);
pub const CARD_BORDER: Color32 = Color32::from_rgb(0xe5, 0xe7, 0xeb);

// =============================================================================
// BRAND
// =============================================================================
pub const PRIMARY: Color32 = Color32::from_rgb(0x4f, 0x46, 0xe5);
pub const PRIMARY_LIGHT: Color32 = Color32::from_rgb(0xe0, 0xe7, 0xff);

// =============================================================================
// MONEY
// =============================================================================
pub const SUCCESS: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
pub const SUCCESS_BG: Color32 = Color32::from_rgb(0xec, 0xfd, 0xf5);
pub const SUCCESS_TEXT: Color32 = Color32::from_rgb(0x06, 0x5f, 0x46);

// =============================================================================
// BUTTONS
// =============================================================================
pub const COPY_BUTTON: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
pub const RECEIPT_BUTTON: Color32 = Color32::from_rgb(0x8b, 0x5c, 0xf6);
pub const EDIT_BUTTON: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
pub const DELETE_BUTTON: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
pub const NEUTRAL_BUTTON: Color32 = Color32::from_rgb(0xe5, 0xe7, 0xeb);

// =============================================================================
// TEXT
// =============================================================================
pub const HEADING_TEXT: Color32 = Color32::from_rgb(0x11, 0x18, 0x27);
pub const BODY_TEXT: Color32 = Color32::from_rgb(0x1f, 0x29, 0x37);
pub const LABEL_TEXT: Color32 = Color32::from_rgb(0x37, 0x41, 0x51);
pub const DIM_TEXT: Color32 = Color32::from_rgb(0x6b, 0x72, 0x80);
pub const ON_DARK_DIM: Color32 = Color32::from_rgb(0xe5, 0xe7, 0xeb);

// =============================================================================
// LAYOUT
// =============================================================================
pub const CARD_MIN_WIDTH: f32 = 420.0;
pub const CARD_PADDING: f32 = 20.0;
pub const MAX_CARDS_PER_ROW: usize = 3;
pub const HEADER_HEIGHT: f32 = 80.0;
pub const SPLASH_SECONDS: f64 = 1.5;

/// Apply the light palette to the egui context.
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = PAGE_BG;
    visuals.window_fill = CARD_BG;
    visuals.hyperlink_color = PRIMARY;
    visuals.selection.bg_fill = PRIMARY_LIGHT;
    visuals.selection.stroke.color = PRIMARY;
    ctx.set_visuals(visuals);
}

/// Number of result cards per row for the given available width.
pub fn cards_per_row(available_width: f32) -> usize {
    let per_card = CARD_MIN_WIDTH + CARD_PADDING;
    ((available_width / per_card).floor() as usize).clamp(1, MAX_CARDS_PER_ROW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_per_row() {
        assert_eq!(cards_per_row(0.0), 1);
        assert_eq!(cards_per_row(500.0), 1);
        assert_eq!(cards_per_row(900.0), 2);
        assert_eq!(cards_per_row(5000.0), 3);
    }
}
