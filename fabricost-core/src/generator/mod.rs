//! Output generators: clipboard text, receipt image and PDF quotes.

mod pdf;
mod receipt;
mod text;

pub use pdf::{generate_detailed_pdf, generate_simple_pdf, DETAILED_PDF_FILE, SIMPLE_PDF_FILE};
pub use receipt::{receipt_file_name, render_receipt, save_receipt, RECEIPT_HEIGHT, RECEIPT_WIDTH};
pub use text::{
    card_details, clipboard_text, format_quantity, input_recap, piece_title, summary_line,
    PieceLines,
};
