//! Byte-level charset conversion.

use std::borrow::Cow;

use super::Charset;
use crate::debug;

/// Convert `input` from one charset to another.
///
/// Identical charsets borrow the input untouched. Otherwise the bytes are
/// decoded (malformed sequences become U+FFFD) and re-encoded; characters
/// the target cannot represent fall back to the codec's substitution.
pub fn convert(input: &[u8], from: Charset, to: Charset) -> Cow<'_, [u8]> {
    if from == to {
        return Cow::Borrowed(input);
    }

    let decoded = decode(input, from);
    let (encoded, _, had_errors) = to.encoding().encode(&decoded);
    if had_errors {
        debug!("encoding"; "unmappable characters replaced converting {} -> {}", from, to);
    }
    Cow::Owned(encoded.into_owned())
}

/// Decode `input` into UTF-8 text.
pub fn decode(input: &[u8], from: Charset) -> Cow<'_, str> {
    let (text, had_errors) = from.encoding().decode_without_bom_handling(input);
    if had_errors {
        debug!("encoding"; "malformed {} input replaced with U+FFFD", from);
    }
    text
}

/// Convert between charsets named by label.
///
/// An unknown or unsupported label is recovered locally: the input passes
/// through unchanged rather than failing the caller.
pub fn convert_labels<'a>(input: &'a [u8], from: &str, to: &str) -> Cow<'a, [u8]> {
    match (Charset::from_label(from), Charset::from_label(to)) {
        (Ok(from), Ok(to)) => convert(input, from, to),
        (Err(e), _) | (_, Err(e)) => {
            debug!("encoding"; "{}, passing input through", e);
            Cow::Borrowed(input)
        }
    }
}
