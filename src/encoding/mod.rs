//! Charset resolution and transcoding.
//!
//! Fetched pages routinely lie about their charset. [`resolve_encoding`]
//! weighs the transport header, the in-body `<meta>` declaration and a
//! statistical sniff of the `<title>` text, then decodes the body to UTF-8.

mod charset;
mod resolve;
mod transcode;

pub use charset::{Charset, EncodingHint};
pub use resolve::{resolve_encoding, to_utf8};
pub use transcode::convert_labels;
