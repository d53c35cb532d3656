//! Error types for message construction.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field was empty after sanitizing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
