//! Fetch a page and rewrite it to be browsed through this relay.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::core::RelayError;
use crate::fetch::{FetchOptions, FetchedPage, fetch};
use crate::link::{LinkRewriteContext, UrlNormalizer, rewrite_for_proxy};
use crate::log;

/// Knobs for [`web_proxy`].
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub fetch: FetchOptions,
    pub preserve_query: bool,
    /// Retry a failed `https://` fetch once over `http://`.
    pub fallback_to_http: bool,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            preserve_query: true,
            fallback_to_http: false,
        }
    }
}

/// Fetch `link` and rewrite its references to route through `self_link`.
///
/// `link` is query-unescaped once more here, on top of whatever decoding the
/// caller's query parser already did. The page is returned whole or not at all.
pub fn web_proxy(link: &str, self_link: &str, settings: &ProxySettings) -> Result<String, RelayError> {
    Url::parse(self_link).map_err(|e| RelayError::invalid_url(self_link, e))?;

    let link = prepare_link(link)?;
    let page = fetch_with_fallback(&link, settings)?;

    let ctx = LinkRewriteContext::new(page.final_url.as_str(), self_link)?
        .with_normalizer(UrlNormalizer::new(settings.preserve_query));
    let rewritten = rewrite_for_proxy(&page.body, &ctx)?;

    log!(
        "proxy";
        "{} ({}, {} links rewritten)",
        link, page.status_text, rewritten.stats.rewritten()
    );
    Ok(rewritten.html)
}

/// Unescape the raw query value and check it names an http(s) page.
pub fn prepare_link(raw: &str) -> Result<String, RelayError> {
    let link = query_unescape(raw);
    let link = match link.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => link.into_owned(),
    };

    if link.starts_with("http") {
        Ok(link)
    } else {
        Err(RelayError::UnsupportedLink(link))
    }
}

/// `+` is a space, then percent-decoding; invalid UTF-8 is replaced.
fn query_unescape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['+', '%']) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    Cow::Owned(percent_decode_str(&spaced).decode_utf8_lossy().into_owned())
}

fn fetch_with_fallback(link: &str, settings: &ProxySettings) -> Result<FetchedPage, RelayError> {
    match fetch(link, &settings.fetch) {
        Err(err) if settings.fallback_to_http && err.is_transport() => {
            let Some(rest) = link.strip_prefix("https://") else {
                return Err(err);
            };
            log!("proxy"; "{}: {}, retrying over http", link, err);
            fetch(&format!("http://{rest}"), &settings.fetch)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetch::{test_response, test_serve};

    const SELF_LINK: &str = "http://relay.local:5280/proxy";

    #[test]
    fn test_prepare_link() {
        assert_eq!(
            prepare_link("http%3A%2F%2Fa.com%2Fx%3Fq%3D1").unwrap(),
            "http://a.com/x?q=1"
        );
        assert_eq!(prepare_link("//a.com/x").unwrap(), "https://a.com/x");
        assert_eq!(prepare_link("%2F%2Fa.com%2Fx").unwrap(), "https://a.com/x");
        assert_eq!(prepare_link("https://a.com/a+b").unwrap(), "https://a.com/a b");
        assert_eq!(prepare_link("https://a.com/").unwrap(), "https://a.com/");
    }

    #[test]
    fn test_unsupported_link() {
        for link in ["ftp://a.com/f", "/relative/page", "", "mailto%3Ax%40a.com"] {
            let err = prepare_link(link).unwrap_err();
            assert!(matches!(err, RelayError::UnsupportedLink(_)), "{link}");
        }

        let err = web_proxy("ftp://a.com/f", SELF_LINK, &ProxySettings::default()).unwrap_err();
        assert_eq!(err.to_string(), "unable to read page `ftp://a.com/f`");
    }

    #[test]
    fn test_invalid_self_link() {
        let err = web_proxy("http://a.com/", "relay", &ProxySettings::default()).unwrap_err();
        assert!(matches!(err, RelayError::InvalidUrl { .. }));
    }

    #[test]
    fn test_web_proxy_rewrites_fetched_page() {
        let html = r#"<html><head><meta charset="gbk"><title>Home</title>
<link rel="stylesheet" href="/css/site.css"></head>
<body><a href="../next.html">下一页</a><a href="http://relay.local:5280/proxy?link=x">self</a>
<img src="img/logo.png"><a href="javascript:void(0)">js</a></body></html>"#;
        let (gbk, _, _) = encoding_rs::GBK.encode(html);
        let gbk = gbk.into_owned();
        let base = test_serve(1, move |_| test_response(gbk.clone(), "text/html"));

        let link = format!("{base}/news/index.html");
        let out = web_proxy(&link, SELF_LINK, &ProxySettings::default()).unwrap();

        assert!(out.contains("下一页"));
        assert!(out.contains(r#"href="http://relay.local:5280/proxy?link=..%2Fnext.html""#));
        assert!(out.contains(r#"href="http://relay.local:5280/proxy?link=x""#));
        assert!(out.contains(&format!(r#"href="{base}/css/site.css""#)));
        assert!(out.contains(&format!(r#"src="{base}/news/img/logo.png""#)));
        assert!(out.contains(r#"href="javascript:void(0)""#));
    }

    #[test]
    fn test_fallback_to_http() {
        let base = test_serve(2, |_| test_response("<p>plain</p>", "text/html"));
        let https = base.replacen("http://", "https://", 1);
        let settings = ProxySettings {
            fetch: FetchOptions {
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
            fallback_to_http: true,
            ..Default::default()
        };

        let out = web_proxy(&https, SELF_LINK, &settings).unwrap();
        assert!(out.contains("<p>plain</p>"));

        let strict = ProxySettings {
            fallback_to_http: false,
            ..settings
        };
        let base = test_serve(1, |_| test_response("<p>plain</p>", "text/html"));
        let https = base.replacen("http://", "https://", 1);
        assert!(web_proxy(&https, SELF_LINK, &strict).unwrap_err().is_transport());
    }
}
