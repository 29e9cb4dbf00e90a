//! Error types for record sources.

use thiserror::Error;

/// Failure to obtain a listing from the record source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Network failure, timeout, or a response without a usable body.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The source answered but the listing could not be decoded.
    #[error("malformed listing: {message}")]
    Malformed { message: String },
}

pub type Result<T> = std::result::Result<T, SourceError>;
