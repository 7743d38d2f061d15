//! Ctrl+C handling for serve mode.
//!
//! One-shot commands simply exit on Ctrl+C. Once a server is registered the
//! signal wakes its listener instead, and in-flight requests finish while new
//! ones get 503.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

static SIGNAL: ShutdownSignal = ShutdownSignal::new();

/// What a Ctrl+C turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// No server to drain; the process should exit.
    Exit,
    /// The registered listener was woken up.
    Unblocked,
}

struct ShutdownSignal {
    requested: AtomicBool,
    server: OnceLock<Arc<Server>>,
}

impl ShutdownSignal {
    const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            server: OnceLock::new(),
        }
    }

    fn trigger(&self) -> Trigger {
        self.requested.store(true, Ordering::SeqCst);
        match self.server.get() {
            Some(server) => {
                server.unblock();
                Trigger::Unblocked
            }
            None => Trigger::Exit,
        }
    }

    fn register(&self, server: Arc<Server>) {
        let _ = self.server.set(server);
    }

    fn is_requested(&self) -> bool {
        // A late reader only lets one more request through
        self.requested.load(Ordering::Relaxed)
    }
}

/// Install the process Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| match SIGNAL.trigger() {
        Trigger::Exit => std::process::exit(0),
        Trigger::Unblocked => crate::log!("serve"; "shutting down..."),
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Hand the bound server to the Ctrl+C handler.
pub fn register_server(server: Arc<Server>) {
    SIGNAL.register(server);
}

pub fn is_shutdown() -> bool {
    SIGNAL.is_requested()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_without_server_exits() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_requested());
        assert_eq!(signal.trigger(), Trigger::Exit);
        assert!(signal.is_requested());
    }

    #[test]
    fn test_trigger_unblocks_registered_server() {
        let signal = ShutdownSignal::new();
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        signal.register(Arc::clone(&server));

        assert_eq!(signal.trigger(), Trigger::Unblocked);
        assert!(signal.is_requested());
        // The unblocked listener stops yielding requests
        assert!(server.incoming_requests().next().is_none());
    }
}
