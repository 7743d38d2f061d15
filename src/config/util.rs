//! Config file discovery.

use std::path::{Path, PathBuf};

/// Find `config_name` in the current directory or the nearest ancestor.
///
/// ```text
/// /srv/relay/logs/            <- cwd
/// /srv/relay/pagerelay.toml   <- found
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Like [`find_config_file`], starting at `start`. Absolute names are only
/// checked for existence.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.is_file().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================
