//! Error types for symbology computation.
//!
//! None of these reach the render boundary: components log them and fall
//! back to a hidden element.

use thiserror::Error;

use crate::modes::EfisNdMode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbologyError {
    /// ND mode has no entry in a geometry table
    #[error("unsupported display mode: {0}")]
    UnsupportedDisplayMode(EfisNdMode),

    /// Raw ND mode value that maps to no known mode
    #[error("unknown display mode value: {0}")]
    UnknownDisplayMode(i64),

    /// Needle index outside 1..=2
    #[error("invalid needle index {0}, expected 1 or 2")]
    InvalidNeedleIndex(u8),

    /// Raw navaid selector value that maps to no known mode
    #[error("unknown navaid mode value: {0}")]
    UnknownNavAidMode(i64),

    /// Display index outside 1..=2
    #[error("invalid display index {0}, expected 1 or 2")]
    InvalidDisplayIndex(u8),

    /// A channel carried a value of the wrong type
    #[error("channel {name} carries {found}, expected {expected}")]
    ChannelType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type SymbologyResult<T> = Result<T, SymbologyError>;
