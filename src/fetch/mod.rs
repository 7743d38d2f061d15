//! Fetch remote pages and hand back canonical UTF-8 text.
//!
//! Non-2xx responses are still pages: the status is reported, never turned
//! into an error. Only wire-level failures become [`RelayError::Transport`].

mod client;
mod options;

pub use options::{FetchOptions, Method};

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, SERVER, USER_AGENT};
use url::Url;

use crate::core::RelayError;
use crate::encoding::resolve_encoding;
use crate::debug;

/// A fetched page with its body already resolved to UTF-8.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub headers: HeaderMap,
    pub status: u16,
    /// `"200 OK"` style status line.
    pub status_text: String,
    pub body: String,
    /// URL after redirects; relative links resolve against this.
    pub final_url: Url,
    /// `host[:port]` of the final URL.
    pub domain: String,
    pub scheme: String,
    pub server: Option<String>,
    pub proxy: Option<String>,
}

impl FetchedPage {
    pub fn content_type(&self) -> &str {
        header_str(&self.headers, CONTENT_TYPE)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Fetch `url` and resolve the body's charset.
pub fn fetch(url: &str, opts: &FetchOptions) -> Result<FetchedPage, RelayError> {
    let target = Url::parse(url).map_err(|e| RelayError::invalid_url(url, e))?;
    let client = client::client_for(&target, opts)?;

    let mut request = match opts.method {
        Method::Get => client.get(target.clone()),
        Method::Post => client.post(target.clone()),
    }
    .timeout(opts.timeout)
    .header(USER_AGENT, opts.user_agent());

    if !opts.query.is_empty() {
        request = request.query(&opts.query);
    }
    for (name, value) in &opts.headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(cookies) = opts.cookie_header() {
        request = request.header(COOKIE, cookies);
    }
    if let Some(content_type) = opts.content_type_value() {
        request = request.header(CONTENT_TYPE, content_type);
    }
    if let Some(data) = &opts.data {
        request = request.body(data.clone());
    }

    let transport = |source| RelayError::Transport {
        url: url.to_string(),
        source,
    };

    let response = request.send().map_err(transport)?;
    let status = response.status();
    let headers = response.headers().clone();
    let final_url = response.url().clone();
    let bytes = response.bytes().map_err(transport)?;

    debug!(
        "fetch";
        "{} {} -> {} ({} bytes)",
        opts.method, url, status.as_u16(), bytes.len()
    );

    let content_type = header_str(&headers, CONTENT_TYPE).to_ascii_lowercase();
    let body = resolve_encoding(&bytes, &content_type);

    let host = final_url.host_str().unwrap_or_default();
    let domain = match final_url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let server = headers
        .get(SERVER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(FetchedPage {
        status: status.as_u16(),
        status_text: format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        ),
        body,
        domain,
        scheme: final_url.scheme().to_string(),
        server,
        proxy: opts.proxy.clone(),
        final_url,
        headers,
    })
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::fetch::test_*`)
// ============================================================================

/// Response type produced by [`test_serve`] handlers.
#[cfg(test)]
pub type TestResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

/// Serve up to `requests` requests on a loopback port; returns `http://ip:port`.
#[cfg(test)]
pub fn test_serve<F>(requests: usize, handler: F) -> String
where
    F: Fn(&mut tiny_http::Request) -> TestResponse + Send + 'static,
{
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    std::thread::spawn(move || {
        for mut request in server.incoming_requests().take(requests) {
            let response = handler(&mut request);
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}")
}

/// `body` with a `Content-Type` header.
#[cfg(test)]
pub fn test_response(body: impl Into<Vec<u8>>, content_type: &str) -> TestResponse {
    let header =
        tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()).unwrap();
    tiny_http::Response::from_data(body.into()).with_header(header)
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_fetch_transcodes_gbk_body() {
        let (gbk, _, _) = encoding_rs::GBK.encode("<html><body>中国青年网</body></html>");
        let gbk = gbk.into_owned();
        let url = format!(
            "{}/page",
            test_serve(1, move |_| test_response(gbk.clone(), "text/html; charset=GBK"))
        );

        let page = fetch(&url, &FetchOptions::default()).unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.status_text, "200 OK");
        assert!(page.is_success());
        assert_eq!(page.body, "<html><body>中国青年网</body></html>");
        assert_eq!(page.content_type(), "text/html; charset=GBK");
        assert_eq!(page.scheme, "http");
        assert!(page.domain.starts_with("127.0.0.1:"));
        assert_eq!(page.final_url.as_str(), url);
    }

    #[test]
    fn test_fetch_sends_options() {
        let base = test_serve(1, |request| {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            let header = |name: &str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.to_string().eq_ignore_ascii_case(name))
                    .map(|h| h.value.as_str().to_string())
                    .unwrap_or_default()
            };
            let echo = format!(
                "{} {} ua={} cookie={} type={} x={} body={}",
                request.method(),
                request.url(),
                header("User-Agent"),
                header("Cookie"),
                header("Content-Type"),
                header("X-Token"),
                body
            );
            test_response(echo, "text/plain; charset=utf-8")
        });

        let opts = FetchOptions {
            method: Method::Post,
            content_type: Some("json".into()),
            query: vec![("q".into(), "a b".into())],
            data: Some(r#"{"k":1}"#.into()),
            headers: vec![("X-Token".into(), "t1".into())],
            cookies: vec![("sid".into(), "1".into())],
            mobile: true,
            ..Default::default()
        };
        let page = fetch(&format!("{base}/page"), &opts).unwrap();

        assert!(page.body.starts_with("POST /page?q=a+b "), "{}", page.body);
        assert!(page.body.contains(&format!("ua={}", options::MOBILE_USER_AGENT)));
        assert!(page.body.contains("cookie=sid=1"));
        assert!(page.body.contains("type=application/json"));
        assert!(page.body.contains("x=t1"));
        assert!(page.body.ends_with(r#"body={"k":1}"#));
    }

    #[test]
    fn test_dial_override_pins_host() {
        let base = test_serve(1, |request| {
            let host = request
                .headers()
                .iter()
                .find(|h| h.field.to_string().eq_ignore_ascii_case("host"))
                .map(|h| h.value.as_str().to_string())
                .unwrap_or_default();
            test_response(host, "text/plain")
        });
        let addr: std::net::SocketAddr = base.trim_start_matches("http://").parse().unwrap();

        let opts = FetchOptions {
            timeout: Duration::from_secs(5),
            dial_override: Some(addr),
            ..Default::default()
        };
        let url = format!("http://pinned.invalid:{}/", addr.port());
        let page = fetch(&url, &opts).unwrap();
        assert_eq!(page.body, format!("pinned.invalid:{}", addr.port()));
        assert_eq!(page.domain, format!("pinned.invalid:{}", addr.port()));
    }

    #[test]
    fn test_error_status_is_not_an_error() {
        let base = test_serve(1, |_| test_response("gone", "text/plain").with_status_code(404));
        let page = fetch(&base, &FetchOptions::default()).unwrap();
        assert_eq!(page.status, 404);
        assert_eq!(page.status_text, "404 Not Found");
        assert!(!page.is_success());
        assert_eq!(page.body, "gone");
    }

    #[test]
    fn test_invalid_url() {
        let err = fetch("not a url", &FetchOptions::default()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidUrl { .. }));
    }

    #[test]
    fn test_connection_refused_is_transport() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let opts = FetchOptions {
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let err = fetch(&format!("http://127.0.0.1:{port}/"), &opts).unwrap_err();
        assert!(err.is_transport());
    }
}
