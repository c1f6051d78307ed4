//! Page-at-a-time querying with opaque continuation tokens.

use singletable_core::pagination;
use singletable_core::query::QueryBuilder;
use singletable_core::storage::ItemStore;
use singletable_core::AttributeMap;

use crate::error::Result;

/// One page of items plus the token that resumes after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<AttributeMap>,
    /// `None` on the last page.
    pub next_token: Option<String>,
}

/// Runs `query` against `store`, resuming from `token` when one is given.
///
/// The returned token is fed back unchanged to read the following page.
pub async fn fetch_page(
    store: &dyn ItemStore,
    query: &QueryBuilder,
    token: Option<&str>,
) -> Result<Page> {
    let spec = query.clone().next_token(token)?.build(store.table_name())?;
    let result = store.query(&spec).await?;
    let next_token = pagination::encode(result.last_evaluated_key.as_ref())?;

    tracing::debug!(
        table = %spec.table_name(),
        index = ?spec.index_name(),
        items = result.items.len(),
        has_more = next_token.is_some(),
        "Fetched page"
    );

    Ok(Page {
        items: result.items,
        next_token,
    })
}
