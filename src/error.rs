//! Error types for the Topos SOM engine.

use thiserror::Error;

/// The main error type for Topos operations.
#[derive(Error, Debug)]
pub enum SomError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An argument violated a precondition of the called operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Feature dimension of the data does not match the map.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the map was built for.
        expected: usize,
        /// The dimension actually supplied.
        actual: usize,
    },

    /// Empty input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The weight grid has not been created yet.
    #[error("Map has not been initialized")]
    NotInitialized,

    /// A numeric domain error (division by zero, undefined logarithm).
    #[error("Numeric error: {0}")]
    Numeric(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Topos operations.
pub type Result<T> = std::result::Result<T, SomError>;
