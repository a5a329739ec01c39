//! Request URL construction.

use std::collections::BTreeMap;
use url::Url;

use crate::retry::FetchError;

/// Query parameters: unique keys, encoded in key order.
pub type Query = BTreeMap<String, String>;

/// Parse `uri` and, when `query` is given, replace its query string with the
/// encoded parameters. An empty `query` clears any query already in `uri`.
///
/// Schemes other than `http` and `https` are rejected here, before any
/// transport sees the URL.
pub(crate) fn build_url(uri: &str, query: Option<&Query>) -> Result<Url, FetchError> {
    let mut url = Url::parse(uri).map_err(|source| FetchError::InvalidUrl {
        url: uri.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::UnsupportedScheme {
            url: uri.to_string(),
            scheme: url.scheme().to_string(),
        });
    }
    if let Some(query) = query {
        url.set_query(None);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
    }
    Ok(url)
}
