//! Error types for the figure helpers.

use thiserror::Error;

/// Errors raised while shaping chart data or driving a callback.
#[derive(Debug, Error)]
pub enum FigureError {
    /// Palette name not in the supported table
    #[error("unknown palette: {0}")]
    UnknownPalette(String),

    /// Colour string that is neither hex nor a known name
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Columns that should line up do not
    #[error("length mismatch for {name}: expected {expected}, got {actual}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Column referenced by a glyph or tooltip is absent
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Rolling window size
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Histogram bin count
    #[error("invalid bin count: {0}")]
    InvalidBins(usize),

    /// NaN or infinite value where a finite range is required
    #[error("non-finite value at position {0}")]
    NonFiniteValue(usize),

    /// Histogram direction string
    #[error("invalid direction: {0}")]
    InvalidDirection(String),

    /// Bit depth outside 1..=16
    #[error("invalid bit depth: {0}")]
    InvalidBitDepth(u32),

    /// Ragged or empty image input
    #[error("image shape error: {0}")]
    ImageShape(String),

    /// A data source lock was poisoned by a panicking writer
    #[error("data source lock poisoned")]
    SourcePoisoned,

    /// Callback failure reported by a training loop hook
    #[error("callback error: {0}")]
    Callback(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FigureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FigureError::UnknownPalette("Nope_3".to_string());
        assert_eq!(err.to_string(), "unknown palette: Nope_3");

        let err = FigureError::LengthMismatch {
            name: "close".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "length mismatch for close: expected 3, got 2");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FigureError = io.into();
        assert!(matches!(err, FigureError::Io(_)));
    }
}
