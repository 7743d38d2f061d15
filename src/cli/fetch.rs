//! `fetch` command: print a remote page as UTF-8.

use anyhow::Result;

use super::args::FetchArgs;
use super::common::write_output;
use crate::config::RelayConfig;
use crate::fetch::{FetchOptions, Method, fetch};
use crate::{debug, log};

pub fn run_fetch(url: &str, args: &FetchArgs, config: &RelayConfig) -> Result<()> {
    let opts = fetch_options(args, config);
    let page = fetch(url, &opts)?;

    if args.include {
        eprintln!("{}", page.status_text);
        for (name, value) in &page.headers {
            eprintln!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        eprintln!();
    }
    debug!(
        "fetch";
        "{}://{} server={} type={} proxy={}",
        page.scheme,
        page.domain,
        page.server.as_deref().unwrap_or("-"),
        page.content_type(),
        page.proxy.as_deref().unwrap_or("direct")
    );
    if !page.is_success() {
        log!("fetch"; "{} returned {}", page.final_url, page.status_text);
    }

    write_output(page.body.as_bytes(), args.output.as_deref(), "fetch")
}

/// `[fetch]` defaults (already carrying CLI overrides) plus per-request args.
pub fn fetch_options(args: &FetchArgs, config: &RelayConfig) -> FetchOptions {
    let mut opts = config.fetch.options();
    if let Some(method) = &args.method {
        opts.method = Method::parse(method);
    }
    opts.headers.extend(args.headers.iter().cloned());
    opts.cookies.clone_from(&args.cookies);
    opts.data.clone_from(&args.data);
    opts.content_type.clone_from(&args.content_type);
    opts.query.clone_from(&args.query);
    opts.dial_override = args.connect_to;
    opts
}
