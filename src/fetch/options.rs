//! Per-request fetch options.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 11_4_0) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.128 Safari/537.36";

pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_2_3 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1";

/// Request method. Anything that is not `POST` is sent as `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("post") {
            Self::Post
        } else {
            Self::Get
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one [`fetch`](super::fetch) call.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub method: Method,
    /// `json`, `form`, `text` or a full MIME type for the request body.
    pub content_type: Option<String>,
    pub query: Vec<(String, String)>,
    pub data: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Upstream proxy (`http://`, `https://` or `socks5://`).
    pub proxy: Option<String>,
    pub cookies: Vec<(String, String)>,
    /// Explicit user agent; otherwise picked from `mobile`.
    pub user_agent: Option<String>,
    pub mobile: bool,
    /// Connect to this IP instead of resolving the URL's host. The port
    /// still comes from the URL.
    pub dial_override: Option<SocketAddr>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            method: Method::Get,
            content_type: None,
            query: Vec::new(),
            data: None,
            headers: Vec::new(),
            proxy: None,
            cookies: Vec::new(),
            user_agent: None,
            mobile: false,
            dial_override: None,
        }
    }
}

impl FetchOptions {
    pub fn user_agent(&self) -> &str {
        match &self.user_agent {
            Some(ua) if !ua.is_empty() => ua,
            _ if self.mobile => MOBILE_USER_AGENT,
            _ => DESKTOP_USER_AGENT,
        }
    }

    /// Join cookies into one `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }

    /// Expand the short body type names into MIME types.
    pub fn content_type_value(&self) -> Option<&str> {
        let ty = self.content_type.as_deref()?;
        Some(match ty.to_ascii_lowercase().as_str() {
            "json" => "application/json",
            "form" | "urlencoded" => "application/x-www-form-urlencoded",
            "text" => "text/plain",
            "html" => "text/html",
            "xml" => "application/xml",
            _ => ty,
        })
    }

    /// A pinned address is fixed at client build time, so the shared client
    /// for the proxy cannot serve the request.
    pub fn needs_dedicated_client(&self) -> bool {
        self.dial_override.is_some()
    }
}
