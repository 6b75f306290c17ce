//! Error type shared by the codec modules.

use thiserror::Error;

/// Errors raised by the encode/decode/render core.
///
/// A fully transparent image is not an error: it encodes to empty bounds and an
/// empty run list (see [`crate::bounds::Bounds::is_empty`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A value does not fit the one-byte field it is stored in.
    #[error("{what} limit exceeded: {value} (max {max})")]
    LimitExceeded {
        what: &'static str,
        value: usize,
        max: usize,
    },

    /// The hex encoding could not be parsed.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A run refers to a color that the palette does not have.
    #[error("color index {index} has no entry in a palette of {palette_len} colors")]
    DataIntegrity { index: u8, palette_len: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
