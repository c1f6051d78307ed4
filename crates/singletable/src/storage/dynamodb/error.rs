//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `singletable_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_time_to_live::UpdateTimeToLiveError;
use singletable_core::storage::RepositoryError;

const THROUGHPUT_EXCEEDED: &str = "Throughput exceeded, please retry";
const REQUEST_LIMIT_EXCEEDED: &str = "Request limit exceeded, please retry";
const INTERNAL_SERVER_ERROR: &str = "DynamoDB internal server error";
const TABLE_NOT_FOUND: &str = "Table not found";

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        GetItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed(THROUGHPUT_EXCEEDED.to_string())
        }
        GetItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        GetItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::QueryFailed(format!("GetItem failed: {err:?}")),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        QueryError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed(THROUGHPUT_EXCEEDED.to_string())
        }
        QueryError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        QueryError::InternalServerError(_) => {
            RepositoryError::QueryFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::QueryFailed(format!("Query failed: {err:?}")),
    }
}

/// Map a PutItem SDK error to RepositoryError.
///
/// Conditional check failures are expected on the lock path and are
/// filtered out by the caller before reaching this.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => {
            RepositoryError::WriteFailed(TABLE_NOT_FOUND.to_string())
        }
        PutItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::WriteFailed(THROUGHPUT_EXCEEDED.to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            RepositoryError::WriteFailed(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::WriteFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            RepositoryError::WriteFailed("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            RepositoryError::WriteFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::WriteFailed(format!("PutItem failed: {err:?}")),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => {
            RepositoryError::WriteFailed(TABLE_NOT_FOUND.to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::WriteFailed(THROUGHPUT_EXCEEDED.to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            RepositoryError::WriteFailed(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            RepositoryError::WriteFailed("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            RepositoryError::WriteFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::WriteFailed(format!("DeleteItem failed: {err:?}")),
    }
}

/// Map a BatchGetItem SDK error to RepositoryError.
pub fn map_batch_get_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchGetItemError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        BatchGetItemError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        BatchGetItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::QueryFailed(THROUGHPUT_EXCEEDED.to_string())
        }
        BatchGetItemError::RequestLimitExceeded(_) => {
            RepositoryError::QueryFailed(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        BatchGetItemError::InternalServerError(_) => {
            RepositoryError::QueryFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::QueryFailed(format!("BatchGetItem failed: {err:?}")),
    }
}

/// Map a BatchWriteItem SDK error to RepositoryError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => {
            RepositoryError::WriteFailed(TABLE_NOT_FOUND.to_string())
        }
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => {
            RepositoryError::WriteFailed(THROUGHPUT_EXCEEDED.to_string())
        }
        BatchWriteItemError::RequestLimitExceeded(_) => {
            RepositoryError::WriteFailed(REQUEST_LIMIT_EXCEEDED.to_string())
        }
        BatchWriteItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::WriteFailed("Item collection size limit exceeded".to_string())
        }
        BatchWriteItemError::InternalServerError(_) => {
            RepositoryError::WriteFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::WriteFailed(format!("BatchWriteItem failed: {err:?}")),
    }
}

/// Map a CreateTable SDK error to RepositoryError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        CreateTableError::LimitExceededException(_) => {
            RepositoryError::WriteFailed("Table limit exceeded".to_string())
        }
        CreateTableError::InternalServerError(_) => {
            RepositoryError::WriteFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::WriteFailed(format!("CreateTable failed: {err:?}")),
    }
}

/// Map a DescribeTable SDK error to RepositoryError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => {
            RepositoryError::QueryFailed(TABLE_NOT_FOUND.to_string())
        }
        DescribeTableError::InternalServerError(_) => {
            RepositoryError::QueryFailed(INTERNAL_SERVER_ERROR.to_string())
        }
        err => RepositoryError::QueryFailed(format!("DescribeTable failed: {err:?}")),
    }
}

/// Map an UpdateTimeToLive SDK error to RepositoryError.
pub fn map_update_ttl_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateTimeToLiveError, R>,
) -> RepositoryError {
    match err.into_service_error() {
        UpdateTimeToLiveError::ResourceNotFoundException(_) => {
            RepositoryError::WriteFailed(TABLE_NOT_FOUND.to_string())
        }
        err => RepositoryError::WriteFailed(format!("UpdateTimeToLive failed: {err:?}")),
    }
}

/// Map a request builder error (missing required field) to RepositoryError.
pub fn map_build_error(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::InvalidData(err.to_string())
}
