//! Error types for the cortical engine.
//!
//! This module provides a unified error type for all fallible operations in
//! the crate, using the `thiserror` crate for ergonomic error handling.
//!
//! Errors are raised at the bitset and sensor boundaries only. Once a region
//! is constructed and fed inputs of the right length, its step loop never
//! fails.

use thiserror::Error;

/// The main error type for cortical operations.
#[derive(Error, Debug)]
pub enum CorticalError {
    /// Bit index outside a bitset's logical length.
    #[error("bit index {index} out of range for bitset of length {length}")]
    OutOfRange {
        /// The offending index (or one past the last bit a copy would touch).
        index: usize,
        /// The logical length of the bitset.
        length: usize,
    },

    /// Bulk bitset operation across differing logical lengths.
    #[error("bitset length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the receiver.
        expected: usize,
        /// Length of the operand.
        actual: usize,
    },

    /// Sensor value outside its domain, or an unknown category label.
    #[error("cannot encode value: {0}")]
    Encode(String),

    /// Sensor constructed with an insufficient range.
    #[error("invalid sensor configuration: {0}")]
    Config(String),

    /// I/O error from one of the print helpers.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, CorticalError>;
