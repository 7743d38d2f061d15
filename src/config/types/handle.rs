//! Process-wide config handle.
//!
//! `main` installs the loaded config once; serve workers take cheap snapshots
//! through `arc-swap` without locking.

use crate::config::RelayConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

static CONFIG: LazyLock<ArcSwap<RelayConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(RelayConfig::default()));

/// Snapshot of the active config.
pub fn cfg() -> Arc<RelayConfig> {
    CONFIG.load_full()
}

/// Install `config` as the active config and return the shared snapshot.
pub fn init_config(config: RelayConfig) -> Arc<RelayConfig> {
    let config = Arc::new(config);
    CONFIG.store(Arc::clone(&config));
    config
}
