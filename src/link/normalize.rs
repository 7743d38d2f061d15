//! Resolve href/src candidates against the page they were found on.
//!
//! | Candidate          | Example            | Result                           |
//! |--------------------|--------------------|----------------------------------|
//! | blocked            | `#`, `javascript:` | `None` (leave attribute alone)   |
//! | scheme-relative    | `//cdn.com/a.js`   | `https://cdn.com/a.js`           |
//! | absolute           | `http://x.com/p`   | preserved as-is                  |
//! | root-relative      | `/about`           | base origin + path               |
//! | file-relative      | `../img.png`       | base directory + dot collapsing  |

use std::borrow::Cow;

use url::Url;

/// Candidates that never point anywhere useful.
const BLOCKED_EXACT: [&str; 4] = ["#", "./", "../", "../../"];

/// Substrings marking script pseudo-links.
const BLOCKED_CONTAINS: [&str; 2] = ["javascript", "void"];

/// Resolves link candidates into absolute URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlNormalizer {
    /// Carry `?query` and `#fragment` of relative candidates into the result.
    preserve_query: bool,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self {
            preserve_query: true,
        }
    }
}

impl UrlNormalizer {
    pub const fn new(preserve_query: bool) -> Self {
        Self { preserve_query }
    }

    /// Resolve `candidate` against `base`; `None` means the link is filtered.
    pub fn normalize(&self, candidate: &str, base: &str) -> Option<String> {
        if is_blocked(candidate) {
            return None;
        }
        let base = Url::parse(base).ok()?;
        self.normalize_against(candidate, &base)
    }

    /// Like [`normalize`](Self::normalize) with an already parsed base.
    pub fn normalize_against(&self, candidate: &str, base: &Url) -> Option<String> {
        if is_blocked(candidate) {
            return None;
        }

        let candidate: Cow<'_, str> = if candidate.starts_with("//") {
            Cow::Owned(format!("https:{candidate}"))
        } else {
            Cow::Borrowed(candidate)
        };

        match Url::parse(&candidate) {
            Ok(_) => return Some(candidate.into_owned()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {}
            Err(_) => return None,
        }
        // Anything the url crate refuses even relative to a base is unusable
        base.join(&candidate).ok()?;

        let origin = origin_of(base)?;
        let (path, suffix) = split_suffix(&candidate);

        let mut resolved = origin;
        if path.is_empty() {
            // Bare `?query` or `#fragment` refers to the base document itself
            resolved.push_str(base.path());
            if suffix.starts_with('#') && self.preserve_query {
                if let Some(query) = base.query() {
                    resolved.push('?');
                    resolved.push_str(query);
                }
            }
        } else {
            let working = if path.starts_with('/') {
                path.to_string()
            } else {
                format!("{}/{}", parent_dir(base.path()), path)
            };
            resolved.push_str(&collapse_dot_segments(&working));
        }

        if self.preserve_query {
            resolved.push_str(suffix);
        }
        Some(resolved)
    }
}

/// Literal blocklist check; intentionally not a general syntactic rule.
fn is_blocked(candidate: &str) -> bool {
    candidate.is_empty()
        || BLOCKED_CONTAINS.iter().any(|b| candidate.contains(b))
        || BLOCKED_EXACT.contains(&candidate)
}

/// `scheme://host[:port]` of an absolute URL, `None` for host-less bases.
fn origin_of(base: &Url) -> Option<String> {
    let host = base.host_str()?;
    Some(match base.port() {
        Some(port) => format!("{}://{}:{}", base.scheme(), host, port),
        None => format!("{}://{}", base.scheme(), host),
    })
}

/// Split `path?query#fragment` into the path and the rest.
fn split_suffix(candidate: &str) -> (&str, &str) {
    let at = candidate.find(['?', '#']).unwrap_or(candidate.len());
    candidate.split_at(at)
}

/// Everything before the last `/` (`/b/c.html` -> `/b`, `/c.html` -> ``).
fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Collapse `.`, `..` and empty segments.
///
/// A `..` that would climb above the root is kept rather than rejected, so
/// `/../x` survives as a best-effort path.
fn collapse_dot_segments(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    if path.starts_with('/') {
        // Root marker: rejoins into the leading slash
        stack.push("");
    }

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                Some(top) if !top.is_empty() && *top != ".." => {
                    stack.pop();
                }
                _ => stack.push(".."),
            },
            _ => stack.push(segment),
        }
    }

    stack.join("/")
}
