//! Command-line interface module.

mod args;
pub mod common;
pub mod convert;
pub mod fetch;
pub mod normalize;
pub mod rewrite;
pub mod serve;

pub use args::{Cli, Commands, FetchArgs};
