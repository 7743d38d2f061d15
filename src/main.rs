//! pagerelay - fetch pages in any charset and relay them through a
//! link-rewriting proxy.

mod cli;
mod config;
mod core;
mod encoding;
mod fetch;
mod link;
mod logger;
mod proxy;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{RelayConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(RelayConfig::load(&cli)?);

    match &cli.command {
        Commands::Fetch { url, args } => cli::fetch::run_fetch(url, args, &config),
        Commands::Convert {
            file,
            from,
            to,
            output,
        } => cli::convert::run_convert(file, from.as_deref(), to, output.as_deref()),
        Commands::Rewrite {
            file,
            base,
            endpoint,
            output,
        } => cli::rewrite::run_rewrite(file, base, endpoint, output.as_deref(), &config),
        Commands::Normalize { link, base, .. } => {
            cli::normalize::run_normalize(link, base, &config)
        }
        Commands::Serve { .. } => cli::serve::bind_server()?.run(),
    }
}
