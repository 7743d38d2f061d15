//! Decide what charset a fetched document is really in.
//!
//! Three independent signals are consulted, most specific last:
//!
//! | Signal | Source                                  | Trust  |
//! |--------|-----------------------------------------|--------|
//! | header | transport `Content-Type`                | lowest |
//! | meta   | `<meta ... charset=...>` in the body    |        |
//! | title  | statistical sniff of the `<title>` text | final  |
//!
//! A known signal always overrides every less specific one; with no signal
//! at all the document is taken to be UTF-8 already.

use std::sync::LazyLock;

use chardetng::EncodingDetector;
use regex::bytes::Regex;

use super::{Charset, EncodingHint, transcode};
use crate::debug;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is-u)<meta[^>]*charset\s*=["']?\s*([A-Za-z0-9\-]+)"#)
        .expect("meta charset pattern is valid")
});

static TITLE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is-u)<title[^>]*>(.*?)</title>").expect("title pattern is valid")
});

/// The three hints seen for one document and the charset chosen from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub header: EncodingHint,
    pub meta: EncodingHint,
    pub title: EncodingHint,
    pub charset: Charset,
}

/// Collect every hint from `body` and `content_type` and pick the winner.
pub fn resolve(body: &[u8], content_type: &str) -> Resolution {
    let header = EncodingHint::classify(content_type);
    let meta = meta_hint(body);
    let title = title_hint(body);

    let charset = [title, meta, header]
        .into_iter()
        .find_map(EncodingHint::charset)
        .unwrap_or(Charset::CANONICAL);

    Resolution {
        header,
        meta,
        title,
        charset,
    }
}

/// Resolve the charset of `body` and return it as canonical UTF-8 text.
pub fn resolve_encoding(body: &[u8], content_type: &str) -> String {
    let resolution = resolve(body, content_type);
    debug!(
        "encoding";
        "header={:?} meta={:?} title={:?} -> {}",
        resolution.header, resolution.meta, resolution.title, resolution.charset
    );
    transcode::decode(body, resolution.charset).into_owned()
}

/// Resolve using in-body signals only (no transport header available).
pub fn to_utf8(body: &[u8]) -> String {
    resolve_encoding(body, "")
}

fn meta_hint(body: &[u8]) -> EncodingHint {
    META_CHARSET
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|label| EncodingHint::classify(&String::from_utf8_lossy(label.as_bytes())))
        .unwrap_or_default()
}

fn title_hint(body: &[u8]) -> EncodingHint {
    let Some(title) = TITLE_TEXT.captures(body).and_then(|caps| caps.get(1)) else {
        return EncodingHint::Unknown;
    };
    sniff(title.as_bytes())
}

/// Statistically guess the charset of a short text fragment.
///
/// Pure ASCII carries no script information, so it yields no opinion
/// instead of the detector's Latin fallback.
fn sniff(fragment: &[u8]) -> EncodingHint {
    if fragment.is_ascii() {
        return EncodingHint::Unknown;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(fragment, true);
    let guess = detector.guess(None, true);
    EncodingHint::classify(guess.name())
}
