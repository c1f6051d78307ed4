use crate::attribute::{get_string, AttributeMap};
use crate::key::{PK, SK};
use crate::pagination;

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<AttributeMap>,
    /// Key of the last item read when more results may follow.
    pub last_evaluated_key: Option<AttributeMap>,
}

impl QueryPage {
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key
            .as_ref()
            .is_some_and(|key| !key.is_empty())
    }

    /// Continuation token for the next page, `None` on the last page.
    pub fn next_token(&self) -> pagination::Result<Option<String>> {
        pagination::encode(self.last_evaluated_key.as_ref())
    }
}

/// `(PK, SK)` of an item, with a missing sort key as the empty string.
pub fn primary_key_identity(item: &AttributeMap) -> Option<(String, String)> {
    let pk = get_string(item, PK)?;
    Some((pk, get_string(item, SK).unwrap_or_default()))
}
