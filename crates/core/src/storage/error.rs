use thiserror::Error;

/// Errors raised by the storage engine behind [`ItemStore`](super::ItemStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Write failed: {0}")]
    WriteFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_repository_error_query_failed_display() {
        let error = RepositoryError::QueryFailed("Table not found".to_string());
        assert_eq!(error.to_string(), "Query failed: Table not found");
    }

    #[test]
    fn test_repository_error_write_failed_display() {
        let error = RepositoryError::WriteFailed("Throughput exceeded, please retry".to_string());
        assert_eq!(
            error.to_string(),
            "Write failed: Throughput exceeded, please retry"
        );
    }

    #[test]
    fn test_repository_error_serialization_display() {
        let error = RepositoryError::Serialization("binary attributes are not supported".to_string());
        assert_eq!(
            error.to_string(),
            "Serialization error: binary attributes are not supported"
        );
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("item has no PK".to_string());
        assert_eq!(error.to_string(), "Invalid data: item has no PK");
    }
}
