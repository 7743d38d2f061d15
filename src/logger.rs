//! `[module]` prefixed log lines on stderr.
//!
//! `fetch` and `convert` stream document bodies to stdout, so nothing here
//! ever writes there. Prefix colors follow `--color` through owo-colors'
//! stream detection.

use owo_colors::{AnsiColors, OwoColorize, Stream};
use std::{
    io::{Write, stderr},
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Log a message with a colored module prefix
///
/// ```ignore
/// log!("serve"; "http://{}", addr);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let mut stderr = stderr().lock();
    writeln!(stderr, "{} {message}", prefix(module)).ok();
}

fn prefix(module: &str) -> String {
    let color = module_color(module);
    format!("[{module}]")
        .if_supports_color(Stream::Stderr, |p| p.color(color).bold().to_string())
        .to_string()
}

fn module_color(module: &str) -> AnsiColors {
    match module.to_ascii_lowercase().as_str() {
        "serve" => AnsiColors::BrightBlue,
        "fetch" | "proxy" => AnsiColors::BrightGreen,
        "error" => AnsiColors::BrightRed,
        "encoding" | "rewrite" => AnsiColors::BrightMagenta,
        _ => AnsiColors::BrightYellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_plain_without_color() {
        owo_colors::set_override(false);
        assert_eq!(prefix("serve"), "[serve]");
        assert_eq!(prefix("Fetch"), "[Fetch]");
    }

    #[test]
    fn test_module_colors() {
        assert!(matches!(module_color("PROXY"), AnsiColors::BrightGreen));
        assert!(matches!(module_color("encoding"), AnsiColors::BrightMagenta));
        assert!(matches!(module_color("config"), AnsiColors::BrightYellow));
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
