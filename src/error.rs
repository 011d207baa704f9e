//! Crate-wide error type.
//!
//! The DSP core never raises across the sample boundary: arithmetic
//! saturates silently, preconditions are asserted, and framing failures
//! are reported through the listener callback (see [`crate::listener`]).
//! This error type exists for the ambient, allocating layers: WAV I/O,
//! configuration loading, and test-vector parsing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadlibError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed test vector: {0}")]
    Vector(String),
}

pub type RadlibResult<T> = Result<T, RadlibError>;
