use thiserror::Error;

/// Errors that can occur when constructing or reading a key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
