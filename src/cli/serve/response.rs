//! HTTP response handlers.

use crate::core::RelayError;
use crate::utils::html::escape;
use crate::utils::mime::types::{HTML, PLAIN};
use anyhow::Result;
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Usage page served at `/`.
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>pagerelay</title></head>
<body>
<h1>pagerelay</h1>
<p>Open any page through this relay. Its text is served as UTF-8 and its links keep you inside the relay.</p>
<form method="get" action="{endpoint}">
<input type="url" name="link" placeholder="https://example.com/" size="60" required>
<button type="submit">Go</button>
</form>
<p><code>GET {endpoint}?link=&lt;url&gt;</code></p>
</body>
</html>
"#;

/// HTTP status for a failed proxy request.
pub fn status_for(error: &RelayError) -> u16 {
    match error {
        RelayError::UnsupportedLink(_) | RelayError::InvalidUrl { .. } => 400,
        RelayError::Transport { .. } | RelayError::Client(_) | RelayError::Parse(_) => 502,
    }
}

pub fn respond_index(request: Request, endpoint: &str) -> Result<()> {
    let body = INDEX_HTML.replace("{endpoint}", &escape(endpoint));
    send_body(request, 200, HTML, body.into_bytes())
}

/// Respond with a fully rewritten page.
pub fn respond_page(request: Request, html: String) -> Result<()> {
    send_body(request, 200, HTML, html.into_bytes())
}

pub fn respond_missing_link(request: Request) -> Result<()> {
    respond_error_page(request, 400, "missing `link` query parameter")
}

/// Respond with the error of a failed proxy request; the page is never sent
/// partially.
pub fn respond_relay_error(request: Request, error: &RelayError) -> Result<()> {
    respond_error_page(request, status_for(error), &error_chain(error))
}

/// `error` and its sources on one line, `a: b: c`.
fn error_chain(error: &RelayError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn respond_error_page(request: Request, status: u16, message: &str) -> Result<()> {
    let reason = StatusCode(status).default_reason_phrase();
    let body = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{status} {reason}</title></head>\
         <body><h1>{status} {reason}</h1><pre>{}</pre></body></html>",
        escape(message)
    );
    send_body(request, status, HTML, body.into_bytes())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let head = request.method() == &Method::Head;
    let response = Response::from_data(if head { Vec::new() } else { body })
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for() {
        assert_eq!(status_for(&RelayError::UnsupportedLink("ftp://x".into())), 400);
        assert_eq!(status_for(&RelayError::Parse("bad".into())), 502);

        let source = url::Url::parse("http://").unwrap_err();
        assert_eq!(status_for(&RelayError::invalid_url("http://", source)), 400);
    }

    #[test]
    fn test_error_message_includes_sources() {
        let source = url::Url::parse("http://").unwrap_err();
        let err = RelayError::invalid_url("http://", source);
        let message = error_chain(&err);
        assert!(message.starts_with("invalid url `http://`: "));
        assert!(message.len() > "invalid url `http://`: ".len());
    }
}
