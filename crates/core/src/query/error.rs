use thiserror::Error;

/// Errors that can occur when assembling a query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query requires a partition key condition")]
    MissingPartitionKey,
    #[error("Key has no partition value for index {0}")]
    MissingIndexPartition(String),
}

/// Result type for query building.
pub type Result<T> = std::result::Result<T, QueryError>;
