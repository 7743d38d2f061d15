//! Map request targets to handlers.

use url::form_urlencoded;

/// What a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Usage page.
    Index,
    /// Proxy endpoint with the form-decoded `link` value.
    Proxy(String),
    /// Proxy endpoint without a usable `link` parameter.
    MissingLink,
    NotFound,
}

impl Route {
    /// Route `target` (path plus query) given the configured endpoint path.
    pub fn resolve(target: &str, proxy_path: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));

        if path == "/" || path.is_empty() {
            return Self::Index;
        }
        if path != proxy_path {
            return Self::NotFound;
        }

        match query_param(query, "link") {
            Some(link) if !link.is_empty() => Self::Proxy(link),
            _ => Self::MissingLink,
        }
    }
}

/// First decoded value of `name` in `query`.
fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
