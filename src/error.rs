//! Crate-wide error type.
//!
//! Mirrors the shape of a hand-rolled FFI-era error enum: unit-ish variants
//! carrying just enough context for a caller to act on, a manual `Display`
//! impl, and a `Result<T>` alias used everywhere in the public API.

use std::fmt;

/// Errors produced by the analytics kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Columns of unequal length at construction, or a row whose length
    /// doesn't match the column count.
    LengthMismatch { expected: usize, actual: usize },
    /// A label, column name, or group key was not found.
    NotFound(String),
    /// An integer position fell outside `[0, length)`.
    OutOfRange { index: usize, length: usize },
    /// Merge key resolution failed (missing join column, asymmetric
    /// `left_on`/`right_on` lengths, or no common columns to auto-detect).
    KeySpec(String),
    /// A cell could not be converted to the requested dtype.
    Coercion { position: usize, message: String },
    /// Raised only at external adapter boundaries.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LengthMismatch { expected, actual } => write!(
                f,
                "length mismatch: expected {expected}, got {actual}"
            ),
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::OutOfRange { index, length } => {
                write!(f, "index {index} out of range for length {length}")
            }
            Error::KeySpec(msg) => write!(f, "key specification error: {msg}"),
            Error::Coercion { position, message } => {
                write!(f, "coercion error at position {position}: {message}")
            }
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Result alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
