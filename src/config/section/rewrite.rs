//! `[rewrite]` section configuration.
//!
//! ```toml
//! [rewrite]
//! preserve_query = true       # Keep ?query and #fragment on resolved links
//! ```

use serde::{Deserialize, Serialize};

use crate::link::UrlNormalizer;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub preserve_query: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            preserve_query: true,
        }
    }
}

impl RewriteConfig {
    pub const fn normalizer(&self) -> UrlNormalizer {
        UrlNormalizer::new(self.preserve_query)
    }
}
