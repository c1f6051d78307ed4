//! Opaque continuation tokens.
//!
//! A token is the last evaluated key of a query page, serialized as JSON and
//! encoded as URL-safe base64 without padding. Callers must treat it as a
//! blob: hand it back unchanged to fetch the next page.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::attribute::AttributeMap;

use super::{PaginationError, Result};

/// Encodes the last evaluated key of a page.
///
/// # Returns
/// `None` when there is no last key (or it is empty), meaning no further pages.
pub fn encode(last_evaluated_key: Option<&AttributeMap>) -> Result<Option<String>> {
    let Some(key) = last_evaluated_key.filter(|key| !key.is_empty()) else {
        return Ok(None);
    };

    let json =
        serde_json::to_vec(key).map_err(|e| PaginationError::EncodeFailed(e.to_string()))?;
    Ok(Some(URL_SAFE_NO_PAD.encode(json)))
}

/// Decodes a token back into the exclusive start key of the next query.
///
/// # Returns
/// `None` for an absent or empty token, meaning start from the beginning.
///
/// # Errors
/// A token that is not valid base64, does not hold an attribute map, or
/// holds an empty map is rejected rather than silently restarting the
/// iteration.
pub fn decode(token: Option<&str>) -> Result<Option<AttributeMap>> {
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| PaginationError::InvalidToken(e.to_string()))?;
    let key: AttributeMap =
        serde_json::from_slice(&bytes).map_err(|e| PaginationError::InvalidToken(e.to_string()))?;

    if key.is_empty() {
        return Err(PaginationError::InvalidToken("empty start key".to_string()));
    }
    Ok(Some(key))
}
