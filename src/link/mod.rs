//! Link resolution and proxy rewriting.

mod normalize;
mod rewrite;

pub use normalize::UrlNormalizer;
pub use rewrite::{LinkRewriteContext, Rewritten, rewrite_for_proxy};
