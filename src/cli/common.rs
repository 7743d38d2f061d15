//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::log;

/// Write `bytes` to `output`, or to stdout when no path is given.
pub fn write_output(bytes: &[u8], output: Option<&Path>, module: &str) -> Result<()> {
    if let Some(path) = output {
        fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
        log!(module; "wrote {} bytes to {}", bytes.len(), path.display());
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    Ok(())
}

/// Read a local document, naming the file on failure.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
