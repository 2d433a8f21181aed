//! Error types for compression operations.

use thiserror::Error;

/// Result type alias for compression operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Compression error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing to build a tree from.
    #[error("empty input: at least one byte is required to build a code tree")]
    EmptyInput,

    /// A byte that the code table does not cover.
    #[error("unknown symbol 0x{symbol:02x}: not present in the code tree")]
    UnknownSymbol { symbol: u8 },

    /// Serialized tree ended before the tree was complete.
    #[error("truncated tree: bit stream exhausted at bit {bit_offset}")]
    TruncatedTree { bit_offset: usize },

    /// Serialized tree is structurally invalid.
    #[error("invalid tree: {message}")]
    InvalidTree { message: String },

    /// Compressed body ended before a required field.
    #[error("truncated data: need {needed} bytes, got {available}")]
    TruncatedData { needed: usize, available: usize },

    /// Artifact smaller than the minimum viable size.
    #[error("artifact too short: {len} bytes (minimum is 11)")]
    TooShort { len: usize },

    /// No header end marker after the magic number.
    #[error("header end marker (ff ff ff) not found")]
    MarkerNotFound,

    /// Artifact does not start with the magic number.
    #[error("invalid magic: expected 31 41 59 26, got {found:02x?}")]
    InvalidMagic { found: [u8; 4] },

    /// Bit access past the logical length, or a misaligned integer read.
    #[error("bit index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Input cannot be described by the 32-bit length prefix.
    #[error("input too large: {len} bytes exceeds the 32-bit length field")]
    InputTooLarge { len: u64 },

    /// Invalid configuration value.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// I/O error from underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid tree error.
    pub fn invalid_tree(message: impl Into<String>) -> Self {
        Error::InvalidTree {
            message: message.into(),
        }
    }

    /// Create a truncated tree error at a bit offset.
    pub fn truncated_tree(bit_offset: usize) -> Self {
        Error::TruncatedTree { bit_offset }
    }

    /// Create a truncated data error.
    pub fn truncated_data(needed: usize, available: usize) -> Self {
        Error::TruncatedData { needed, available }
    }

    /// Create an index out of range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Error::IndexOutOfRange { index, len }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with a custom message.
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io(std::io::Error::other(message.into()))
    }

    /// Check if the error describes a malformed artifact rather than a
    /// caller or environment problem.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::TruncatedTree { .. }
                | Error::InvalidTree { .. }
                | Error::TruncatedData { .. }
                | Error::TooShort { .. }
                | Error::MarkerNotFound
                | Error::InvalidMagic { .. }
        )
    }

    /// Get error category for logs.
    pub fn category(&self) -> &'static str {
        match self {
            Error::EmptyInput => "empty_input",
            Error::UnknownSymbol { .. } => "unknown_symbol",
            Error::TruncatedTree { .. } => "truncated_tree",
            Error::InvalidTree { .. } => "invalid_tree",
            Error::TruncatedData { .. } => "truncated_data",
            Error::TooShort { .. } => "too_short",
            Error::MarkerNotFound => "marker_not_found",
            Error::InvalidMagic { .. } => "invalid_magic",
            Error::IndexOutOfRange { .. } => "index_out_of_range",
            Error::InputTooLarge { .. } => "input_too_large",
            Error::Config { .. } => "config",
            Error::Io(_) => "io_error",
        }
    }
}
