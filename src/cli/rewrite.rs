//! `rewrite` command: offline proxy rewrite of a saved document.

use std::path::Path;

use anyhow::Result;

use super::common::{read_input, write_output};
use crate::config::RelayConfig;
use crate::encoding::to_utf8;
use crate::link::{LinkRewriteContext, Rewritten, rewrite_for_proxy};
use crate::log;

pub fn run_rewrite(
    file: &Path,
    base: &str,
    endpoint: &str,
    output: Option<&Path>,
    config: &RelayConfig,
) -> Result<()> {
    let input = read_input(file)?;
    let rewritten = rewrite_document(&input, base, endpoint, config)?;

    let stats = rewritten.stats;
    log!(
        "rewrite";
        "{}: {} via proxy, {} direct, {} same-origin, {} filtered",
        file.display(), stats.through_proxy, stats.direct, stats.leave, stats.dropped
    );
    write_output(rewritten.html.as_bytes(), output, "rewrite")
}

/// Decode `input` to UTF-8 and rewrite it as if fetched from `base`.
pub fn rewrite_document(
    input: &[u8],
    base: &str,
    endpoint: &str,
    config: &RelayConfig,
) -> Result<Rewritten> {
    let html = to_utf8(input);
    let ctx = LinkRewriteContext::new(base, endpoint)?.with_normalizer(config.rewrite.normalizer());
    Ok(rewrite_for_proxy(&html, &ctx)?)
}
