mod builder;
mod error;
mod spec;

pub use builder::QueryBuilder;
pub use error::{QueryError, Result};
pub use spec::{KeyCondition, QuerySpec, SortKeyCondition, DEFAULT_LIMIT};
