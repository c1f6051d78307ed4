mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::ItemStore;
pub use types::{primary_key_identity, QueryPage};
