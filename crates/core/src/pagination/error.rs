use thiserror::Error;

/// Errors that can occur while encoding or decoding a continuation token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// Failed to serialize a last evaluated key.
    #[error("Failed to encode continuation token: {0}")]
    EncodeFailed(String),
    /// The token was not produced by [`encode`](super::encode) or was altered.
    #[error("Invalid continuation token: {0}")]
    InvalidToken(String),
}

/// Result type for pagination operations.
pub type Result<T> = std::result::Result<T, PaginationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_failed_display() {
        let error = PaginationError::EncodeFailed("key must be a string".to_string());
        assert_eq!(
            error.to_string(),
            "Failed to encode continuation token: key must be a string"
        );
    }

    #[test]
    fn test_invalid_token_display() {
        let error = PaginationError::InvalidToken("bad base64".to_string());
        assert_eq!(error.to_string(), "Invalid continuation token: bad base64");
    }
}
