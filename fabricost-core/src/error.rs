//! Error types for quoting and its collaborators.

use thiserror::Error;

/// How an error should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-numeric or missing form fields. Nothing was computed.
    InvalidInput,
    /// The request made no sense in the current state (e.g. no pieces).
    Precondition,
    /// Collaborator failure (storage, image or document output).
    Internal,
}

/// Main error type for FabriCost.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Please enter valid numbers")]
    InvalidNumbers,

    #[error("Invalid value for rule '{field}': {value}")]
    InvalidRule { field: String, value: String },

    #[error("Please add at least one piece")]
    NoPieces,

    #[error("Please calculate pieces first")]
    NotCalculated,

    #[error("Piece {id} not found")]
    PieceNotFound { id: u32 },

    #[error("Unknown calculator mode: {0}")]
    UnknownMode(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Settings database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuoteError {
    /// Classify this error for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuoteError::InvalidNumbers => ErrorKind::InvalidInput,
            QuoteError::InvalidRule { .. } => ErrorKind::InvalidInput,
            QuoteError::UnknownMode(_) => ErrorKind::InvalidInput,
            QuoteError::UnknownLanguage(_) => ErrorKind::InvalidInput,
            QuoteError::NoPieces => ErrorKind::Precondition,
            QuoteError::NotCalculated => ErrorKind::Precondition,
            QuoteError::PieceNotFound { .. } => ErrorKind::Precondition,
            QuoteError::Database(_) => ErrorKind::Internal,
            QuoteError::Serialization(_) => ErrorKind::Internal,
            QuoteError::Image(_) => ErrorKind::Internal,
            QuoteError::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for FabriCost operations.
pub type Result<T> = std::result::Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(QuoteError::InvalidNumbers.kind(), ErrorKind::InvalidInput);
        assert_eq!(QuoteError::NoPieces.kind(), ErrorKind::Precondition);
        assert_eq!(QuoteError::NotCalculated.kind(), ErrorKind::Precondition);
        let io = QuoteError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        assert_eq!(io.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_messages() {
        let err = QuoteError::InvalidRule {
            field: "markup_percent".to_string(),
            value: "-5".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for rule 'markup_percent': -5");
        assert_eq!(QuoteError::PieceNotFound { id: 7 }.to_string(), "Piece 7 not found");
    }
}
