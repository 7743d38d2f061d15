//! `normalize` command: resolve one link the way the rewriter would.

use anyhow::Result;

use crate::config::RelayConfig;

/// Printed for links the rewriter leaves alone.
pub const FILTERED: &str = "FILTERED";

pub fn run_normalize(link: &str, base: &str, config: &RelayConfig) -> Result<()> {
    println!("{}", normalize_line(link, base, config));
    Ok(())
}

pub fn normalize_line(link: &str, base: &str, config: &RelayConfig) -> String {
    config
        .rewrite
        .normalizer()
        .normalize(link, base)
        .unwrap_or_else(|| FILTERED.to_string())
}
