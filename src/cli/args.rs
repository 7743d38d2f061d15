//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Fetch pages, normalize their charset and relay them through a rewriting proxy
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: pagerelay.toml)
    #[arg(short = 'C', long, global = true, default_value = "pagerelay.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch a page and print it as UTF-8
    #[command(visible_alias = "f")]
    Fetch {
        /// Page to fetch
        #[arg(value_hint = clap::ValueHint::Url)]
        url: String,

        #[command(flatten)]
        args: FetchArgs,
    },

    /// Transcode a file between charsets
    #[command(visible_alias = "c")]
    Convert {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Source charset label (e.g. gbk, big5); omit to detect from the document
        #[arg(short, long)]
        from: Option<String>,

        /// Target charset label
        #[arg(short, long, default_value = "utf-8")]
        to: String,

        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Rewrite the links of a local document for the proxy
    #[command(visible_alias = "r")]
    Rewrite {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// URL the document was fetched from
        #[arg(short, long, value_hint = clap::ValueHint::Url)]
        base: String,

        /// Proxy endpoint anchors should route through
        #[arg(short, long, value_hint = clap::ValueHint::Url)]
        endpoint: String,

        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Resolve a link against a base URL
    #[command(visible_alias = "n")]
    Normalize {
        link: String,

        /// Page the link was found on
        #[arg(short, long, value_hint = clap::ValueHint::Url)]
        base: String,

        /// Override `[rewrite] preserve_query`
        #[arg(short = 'q', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        preserve_query: Option<bool>,
    },

    /// Start the proxy server
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Per-invocation request options for `fetch`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Request method (GET or POST)
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    /// Extra request header, `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Cookie, `name=value` (repeatable)
    #[arg(short = 'b', long = "cookie", value_parser = parse_assignment)]
    pub cookies: Vec<(String, String)>,

    /// Query parameter appended to the URL, `name=value` (repeatable)
    #[arg(long = "query", value_parser = parse_assignment)]
    pub query: Vec<(String, String)>,

    /// Connect to this `ip:port` instead of resolving the URL's host
    #[arg(long = "connect-to", value_name = "ADDR")]
    pub connect_to: Option<SocketAddr>,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Body type: json, form, text or a MIME type
    #[arg(short = 'T', long = "type")]
    pub content_type: Option<String>,

    /// Upstream proxy URL
    #[arg(long)]
    pub proxy: Option<String>,

    /// Timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Send the mobile user agent
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub mobile: Option<bool>,

    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// Print the status line and response headers to stderr
    #[arg(short = 'I', long)]
    pub include: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    split_pair(s, ':').ok_or_else(|| format!("expected `Name: value`, got `{s}`"))
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    split_pair(s, '=').ok_or_else(|| format!("expected `name=value`, got `{s}`"))
}

fn split_pair(s: &str, sep: char) -> Option<(String, String)> {
    let (name, value) = s.split_once(sep)?;
    let name = name.trim();
    (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
}
