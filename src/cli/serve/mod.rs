//! Proxy server.
//!
//! | Target                   | Response                                   |
//! |--------------------------|--------------------------------------------|
//! | `/`                      | usage page                                 |
//! | `{path}?link=<url>`      | fetched page, charset fixed, links relayed |
//! | `{path}` without `link`  | 400                                        |
//! | anything else            | 404                                        |

mod lifecycle;
mod response;
mod route;

use crate::{
    config::{RelayConfig, cfg},
    core::{is_shutdown, register_server},
    debug, log,
    proxy::{ProxySettings, web_proxy},
};
use anyhow::{Context, Result};
use route::Route;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server and register it for Ctrl+C shutdown.
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    log!("serve"; "http://{}{}?link=", addr, config.serve.path);

    Ok(BoundServer { server, addr })
}

impl BoundServer {
    /// Start the request loop (blocking until shutdown).
    pub fn run(self) -> Result<()> {
        run_request_loop(&self.server, cfg())?;
        log!("serve"; "stopped listening on {}", self.addr);
        Ok(())
    }
}

fn run_request_loop(server: &Server, config: Arc<RelayConfig>) -> Result<()> {
    // Each fetch blocks a worker for up to the request timeout
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.serve.workers)
        .thread_name(|i| format!("relay-worker-{i}"))
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }

    debug!("serve"; "request loop stopped");
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &RelayConfig) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let host = host_header(&request);
    let endpoint = config.serve.endpoint(host.as_deref());

    match Route::resolve(request.url(), &config.serve.path) {
        Route::Index => response::respond_index(request, &endpoint),
        Route::MissingLink => response::respond_missing_link(request),
        Route::NotFound => response::respond_not_found(request),
        Route::Proxy(link) => {
            let settings = proxy_settings(config);
            match web_proxy(&link, &endpoint, &settings) {
                Ok(html) => response::respond_page(request, html),
                Err(e) => {
                    log!("proxy"; "{}: {}", link, e);
                    response::respond_relay_error(request, &e)
                }
            }
        }
    }
}

fn proxy_settings(config: &RelayConfig) -> ProxySettings {
    ProxySettings {
        fetch: config.fetch.options(),
        preserve_query: config.rewrite.preserve_query,
        fallback_to_http: config.serve.fallback_to_http,
    }
}

fn host_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("host"))
        .map(|h| h.value.to_string())
}
