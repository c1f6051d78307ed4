use thiserror::Error;

use singletable_core::key::KeyError;
use singletable_core::pagination::PaginationError;
use singletable_core::query::QueryError;
use singletable_core::storage::RepositoryError;

/// Any failure surfaced by this crate's composite operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, Error>;
