//! HTTP client construction.
//!
//! Requests share one client per upstream proxy, so connection pooling and
//! the cookie jar carry across calls. Only a pinned dial address forces a
//! one-off client built with the same settings.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use reqwest::blocking::{Client, ClientBuilder};
use url::Url;

use super::FetchOptions;
use crate::core::RelayError;
use crate::debug;

/// Shared clients keyed by upstream proxy (`""` for direct). The lock is held
/// across check-and-create.
static HTTP_CLIENTS: Mutex<BTreeMap<String, Client>> = Mutex::new(BTreeMap::new());

/// Proxy keys of every shared client built so far.
#[cfg(test)]
static BUILT: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Settings common to shared and one-off clients.
fn builder(proxy: &str) -> Result<ClientBuilder, RelayError> {
    let builder = Client::builder()
        .cookie_store(true)
        .danger_accept_invalid_certs(true);

    if proxy.is_empty() {
        return Ok(builder);
    }
    let proxy = reqwest::Proxy::all(proxy).map_err(RelayError::Client)?;
    Ok(builder.proxy(proxy))
}

fn proxy_key(opts: &FetchOptions) -> &str {
    opts.proxy.as_deref().map_or("", str::trim)
}

/// The process-wide client for `proxy`, built on first use.
pub fn shared_client(proxy: &str) -> Result<Client, RelayError> {
    let mut clients = HTTP_CLIENTS.lock();
    if let Some(client) = clients.get(proxy) {
        return Ok(client.clone());
    }

    let client = builder(proxy)?.build().map_err(RelayError::Client)?;
    debug!("fetch"; "shared http client created (proxy: {:?})", proxy);
    #[cfg(test)]
    BUILT.lock().push(proxy.to_string());

    clients.insert(proxy.to_string(), client.clone());
    Ok(client)
}

/// A one-off client connecting to `opts.dial_override` for the target host.
pub fn dedicated_client(target: &Url, opts: &FetchOptions) -> Result<Client, RelayError> {
    let mut builder = builder(proxy_key(opts))?;
    if let (Some(addr), Some(host)) = (opts.dial_override, target.host_str()) {
        builder = builder.resolve(host, addr);
    }
    builder.build().map_err(RelayError::Client)
}

/// Pick the client that can serve `opts`.
pub fn client_for(target: &Url, opts: &FetchOptions) -> Result<Client, RelayError> {
    if opts.needs_dedicated_client() {
        dedicated_client(target, opts)
    } else {
        shared_client(proxy_key(opts))
    }
}
