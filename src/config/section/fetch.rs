//! `[fetch]` section configuration.
//!
//! Defaults for every outbound request, whether made by `pagerelay fetch` or
//! by the proxy server.
//!
//! # Example
//!
//! ```toml
//! [fetch]
//! timeout = 90                # Request timeout in seconds
//! mobile = false              # Send the mobile user agent
//! user_agent = "relay/1.0"    # Overrides the desktop/mobile choice
//! proxy = "socks5://127.0.0.1:1080"
//!
//! [fetch.headers]
//! Accept-Language = "zh-CN,zh;q=0.9"
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::fetch::FetchOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,

    pub user_agent: Option<String>,

    pub mobile: bool,

    /// Upstream proxy URL.
    pub proxy: Option<String>,

    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 90,
            user_agent: None,
            mobile: false,
            proxy: None,
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    /// Request options seeded from this section.
    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            mobile: self.mobile,
            proxy: self.proxy.clone(),
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..FetchOptions::default()
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.timeout == 0 {
            diag.error_with_hint(
                FieldPath::new("fetch.timeout"),
                "timeout must be greater than zero",
                "the default is 90 seconds",
            );
        }

        if let Some(proxy) = &self.proxy
            && url::Url::parse(proxy).is_err()
        {
            diag.error_with_hint(
                FieldPath::new("fetch.proxy"),
                format!("`{proxy}` is not a valid proxy url"),
                "use a full url such as `http://127.0.0.1:3128`",
            );
        }

        for name in self.headers.keys() {
            if name.is_empty() || name.contains([':', ' ']) {
                diag.error(
                    FieldPath::new("fetch.headers"),
                    format!("invalid header name `{name}`"),
                );
            }
        }
    }
}
