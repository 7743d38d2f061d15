//! Core types shared across the codebase.

mod error;
mod state;

pub use error::{EncodingError, RelayError};
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
