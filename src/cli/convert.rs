//! `convert` command: transcode a local file between charsets.

use std::path::Path;

use anyhow::Result;

use super::common::{read_input, write_output};
use crate::encoding::{Charset, convert_labels, to_utf8};
use crate::log;

pub fn run_convert(file: &Path, from: Option<&str>, to: &str, output: Option<&Path>) -> Result<()> {
    for label in from.into_iter().chain([to]) {
        if let Err(e) = Charset::from_label(label) {
            log!("warning"; "{}, writing input unchanged", e);
        }
    }

    let input = read_input(file)?;
    let converted = transcode_document(&input, from, to);
    write_output(&converted, output, "convert")
}

/// Transcode `input`; without `from` the source charset is resolved from the
/// document itself.
pub fn transcode_document(input: &[u8], from: Option<&str>, to: &str) -> Vec<u8> {
    match from {
        Some(from) => convert_labels(input, from, to).into_owned(),
        None => {
            let text = to_utf8(input);
            convert_labels(text.as_bytes(), Charset::CANONICAL.name(), to).into_owned()
        }
    }
}
