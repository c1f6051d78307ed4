//! Site-scoped key values.
//!
//! Multi-tenant tables prefix partition values with the owning site id
//! (`site/value`). The default site is stored without a prefix.

pub const DEFAULT_SITE_ID: &str = "default";

/// Returns true for `None` or the default site.
pub fn is_default_site(site_id: Option<&str>) -> bool {
    site_id.is_none_or(|s| s == DEFAULT_SITE_ID)
}

/// Prefix a key value with its site id.
///
/// Pattern: `<site_id>/<id>`, or `<id>` for the default site.
pub fn create_database_key(site_id: Option<&str>, id: &str) -> String {
    match site_id {
        Some(site) if site != DEFAULT_SITE_ID => format!("{site}/{id}"),
        _ => id.to_string(),
    }
}

/// Strip the site prefix added by [`create_database_key`].
///
/// Without a site id the default site prefix is removed if present.
pub fn reset_database_key(site_id: Option<&str>, value: &str) -> String {
    let site = site_id.unwrap_or(DEFAULT_SITE_ID);
    value
        .strip_prefix(site)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(value)
        .to_string()
}
