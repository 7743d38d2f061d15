//! Error taxonomy shared by fetch, proxy and rewrite paths.

use thiserror::Error;

/// Failures that abort a fetch or a proxied page.
///
/// A proxied page either renders completely or fails with one of these;
/// no half-rewritten document is ever handed back.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),

    #[error("invalid url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot parse document: {0}")]
    Parse(String),

    #[error("unable to read page `{0}`")]
    UnsupportedLink(String),
}

impl RelayError {
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Whether the failure happened on the wire (connect, TLS, timeout).
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// A charset label that `encoding_rs` cannot construct a codec for.
///
/// Never surfaced to users: callers recover by passing text through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("unknown charset label `{0}`")]
    UnknownLabel(String),

    #[error("charset `{0}` is not supported")]
    Unsupported(String),
}
