//! Entity handling at the HTML boundary.
//!
//! Attribute values come out of `lol_html` still entity-encoded, so links are
//! decoded with [`unescape`] before resolution. Text written into generated
//! pages goes through [`escape`].

use std::borrow::Cow;

/// Longest reference body worth decoding (`#x10FFFF` fits).
const MAX_ENTITY_LEN: usize = 10;

/// Escape `< > & " '` so `s` is safe in element text and quoted attributes.
pub fn escape(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find(['<', '>', '&', '"', '\'']) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decode character references in an attribute value.
///
/// Unknown or unterminated references, like the bare `&` between query
/// parameters, are kept verbatim.
pub fn unescape(s: &str) -> Cow<'_, str> {
    let mut pieces = s.split('&');
    let Some(head) = pieces.next().filter(|head| head.len() < s.len()) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(head);
    for piece in pieces {
        let decoded = piece
            .split_once(';')
            .filter(|(name, _)| !name.is_empty() && name.len() <= MAX_ENTITY_LEN)
            .and_then(|(name, rest)| Some((reference(name)?, rest)));

        match decoded {
            Some((c, rest)) => {
                out.push(c);
                out.push_str(rest);
            }
            None => {
                out.push('&');
                out.push_str(piece);
            }
        }
    }
    Cow::Owned(out)
}

/// The character named by `name` in `&name;`.
fn reference(name: &str) -> Option<char> {
    let c = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            return char::from_u32(code);
        }
    };
    Some(c)
}
