//! Rewrite document references so a page can be served from the proxy.
//!
//! | Element          | Attribute | Cross-origin result                        |
//! |------------------|-----------|--------------------------------------------|
//! | `<a>`            | `href`    | `{endpoint}?link={escaped original href}`  |
//! | `<img>`          | `src`     | normalized absolute URL                    |
//! | `<link>`         | `href`    | normalized absolute URL                    |
//! | `<script>`       | `src`     | normalized absolute URL                    |
//!
//! Anchors keep the *original* link text so the next hop resolves it
//! against the next page's base URL. Static resources are terminal and go
//! straight to the origin.

use std::cell::RefCell;

use lol_html::html_content::Element;
use lol_html::{HandlerResult, RewriteStrSettings, element, rewrite_str};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use super::UrlNormalizer;
use crate::core::RelayError;
use crate::debug;
use crate::utils::html::unescape;

/// Query-value escaping: everything except RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The four element kinds whose references get rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Anchor,
    Image,
    Stylesheet,
    Script,
}

impl ReferenceKind {
    pub const fn attr(self) -> &'static str {
        match self {
            Self::Anchor | Self::Stylesheet => "href",
            Self::Image | Self::Script => "src",
        }
    }

    /// Navigable references stay inside the proxy loop.
    pub const fn is_navigable(self) -> bool {
        matches!(self, Self::Anchor)
    }
}

/// What to do with one attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteDecision {
    /// Already same-origin; attribute untouched.
    Leave,
    /// Route through the proxy endpoint.
    ThroughProxy(String),
    /// Point straight at the normalized origin URL.
    Direct(String),
    /// Filtered by the normalizer; attribute untouched.
    Drop,
}

/// Per-document counters, one per decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub leave: usize,
    pub through_proxy: usize,
    pub direct: usize,
    pub dropped: usize,
}

impl RewriteStats {
    fn record(&mut self, decision: &RewriteDecision) {
        match decision {
            RewriteDecision::Leave => self.leave += 1,
            RewriteDecision::ThroughProxy(_) => self.through_proxy += 1,
            RewriteDecision::Direct(_) => self.direct += 1,
            RewriteDecision::Drop => self.dropped += 1,
        }
    }

    pub const fn rewritten(&self) -> usize {
        self.through_proxy + self.direct
    }
}

/// A rewritten document and what happened to its references.
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub html: String,
    pub stats: RewriteStats,
}

/// Everything a rewrite needs to know about the current proxy request.
#[derive(Debug, Clone)]
pub struct LinkRewriteContext {
    base_url: Url,
    self_origin: String,
    proxy_endpoint: String,
    normalizer: UrlNormalizer,
}

impl LinkRewriteContext {
    /// Build a context; the proxy's own origin is the endpoint's `host[:port]`.
    pub fn new(base_url: &str, proxy_endpoint: &str) -> Result<Self, RelayError> {
        let base = Url::parse(base_url).map_err(|e| RelayError::invalid_url(base_url, e))?;
        let endpoint =
            Url::parse(proxy_endpoint).map_err(|e| RelayError::invalid_url(proxy_endpoint, e))?;

        let host = endpoint.host_str().unwrap_or_default();
        let self_origin = match endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            base_url: base,
            self_origin,
            proxy_endpoint: proxy_endpoint.to_string(),
            normalizer: UrlNormalizer::default(),
        })
    }

    pub fn with_normalizer(mut self, normalizer: UrlNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Decide what happens to one attribute value.
    ///
    /// The same-origin test is textual and runs on the original value, not
    /// on the resolved URL.
    pub fn decide(&self, kind: ReferenceKind, value: &str) -> RewriteDecision {
        let Some(resolved) = self.normalizer.normalize_against(value, &self.base_url) else {
            return RewriteDecision::Drop;
        };

        if !self.self_origin.is_empty() && value.contains(self.self_origin.as_str()) {
            return RewriteDecision::Leave;
        }

        if kind.is_navigable() {
            RewriteDecision::ThroughProxy(self.proxy_link(value))
        } else {
            RewriteDecision::Direct(resolved)
        }
    }

    /// `{endpoint}?link={escaped link}`
    pub fn proxy_link(&self, link: &str) -> String {
        format!(
            "{}?link={}",
            self.proxy_endpoint,
            utf8_percent_encode(link, QUERY_VALUE)
        )
    }
}

/// Rewrite anchors, images, stylesheets and scripts of `html` in one pass.
pub fn rewrite_for_proxy(html: &str, ctx: &LinkRewriteContext) -> Result<Rewritten, RelayError> {
    let stats = RefCell::new(RewriteStats::default());

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| apply(ctx, &stats, ReferenceKind::Anchor, el)),
                element!("img[src]", |el| apply(ctx, &stats, ReferenceKind::Image, el)),
                element!("link[href]", |el| {
                    apply(ctx, &stats, ReferenceKind::Stylesheet, el)
                }),
                element!("script[src]", |el| {
                    apply(ctx, &stats, ReferenceKind::Script, el)
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RelayError::Parse(e.to_string()))?;

    let stats = stats.into_inner();
    debug!(
        "rewrite";
        "{} via proxy, {} direct, {} same-origin, {} filtered",
        stats.through_proxy, stats.direct, stats.leave, stats.dropped
    );

    Ok(Rewritten {
        html: output,
        stats,
    })
}

fn apply(
    ctx: &LinkRewriteContext,
    stats: &RefCell<RewriteStats>,
    kind: ReferenceKind,
    el: &mut Element<'_, '_>,
) -> HandlerResult {
    let attr = kind.attr();
    let Some(raw) = el.get_attribute(attr) else {
        return Ok(());
    };

    let value = unescape(&raw);
    let decision = ctx.decide(kind, &value);
    stats.borrow_mut().record(&decision);

    match decision {
        RewriteDecision::ThroughProxy(url) | RewriteDecision::Direct(url) => {
            el.set_attribute(attr, &url)?;
        }
        RewriteDecision::Leave | RewriteDecision::Drop => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "http://a.com/proxy";

    fn ctx(base: &str) -> LinkRewriteContext {
        LinkRewriteContext::new(base, ENDPOINT).unwrap()
    }

    #[test]
    fn test_self_origin_from_endpoint() {
        assert_eq!(
            ctx("http://other.com/").decide(ReferenceKind::Image, "http://a.com/x.png"),
            RewriteDecision::Leave
        );
        let ctx = LinkRewriteContext::new("http://other.com/", "http://127.0.0.1:5280/proxy")
            .unwrap();
        assert_eq!(
            ctx.decide(ReferenceKind::Anchor, "http://127.0.0.1:5280/proxy?link=x"),
            RewriteDecision::Leave
        );
        // The port is part of the origin string
        assert_eq!(
            ctx.decide(ReferenceKind::Image, "http://127.0.0.1/x.png"),
            RewriteDecision::Direct("http://127.0.0.1/x.png".into())
        );
    }

    #[test]
    fn test_invalid_context_urls() {
        assert!(matches!(
            LinkRewriteContext::new("not a url", ENDPOINT),
            Err(RelayError::InvalidUrl { .. })
        ));
        assert!(LinkRewriteContext::new("http://a.com/", "/proxy").is_err());
    }

    #[test]
    fn test_decide_anchor() {
        let ctx = ctx("http://other.com/dir/page.html");
        assert_eq!(
            ctx.decide(ReferenceKind::Anchor, "http://other.com/p"),
            RewriteDecision::ThroughProxy(
                "http://a.com/proxy?link=http%3A%2F%2Fother.com%2Fp".into()
            )
        );
        // Relative anchors keep their original text
        assert_eq!(
            ctx.decide(ReferenceKind::Anchor, "../next.html"),
            RewriteDecision::ThroughProxy("http://a.com/proxy?link=..%2Fnext.html".into())
        );
        assert_eq!(
            ctx.decide(ReferenceKind::Anchor, "http://a.com/p"),
            RewriteDecision::Leave
        );
        assert_eq!(
            ctx.decide(ReferenceKind::Anchor, "javascript:void(0)"),
            RewriteDecision::Drop
        );
    }

    #[test]
    fn test_decide_resources() {
        let ctx = ctx("http://other.com/dir/page.html");
        assert_eq!(
            ctx.decide(ReferenceKind::Image, "http://other.com/i.png"),
            RewriteDecision::Direct("http://other.com/i.png".into())
        );
        assert_eq!(
            ctx.decide(ReferenceKind::Script, "../js/app.js"),
            RewriteDecision::Direct("http://other.com/js/app.js".into())
        );
        assert_eq!(
            ctx.decide(ReferenceKind::Stylesheet, "//cdn.com/s.css"),
            RewriteDecision::Direct("https://cdn.com/s.css".into())
        );
    }

    #[test]
    fn test_rewrite_document() {
        let html = concat!(
            r#"<html><head><link rel="stylesheet" href="/css/site.css">"#,
            r#"<script src="app.js"></script></head><body>"#,
            r#"<a href="http://other.com/p">other</a>"#,
            r#"<a href="http://a.com/p">self</a>"#,
            r##"<a href="#">top</a>"##,
            r#"<img src="http://other.com/i.png">"#,
            r#"</body></html>"#
        );
        let result = rewrite_for_proxy(html, &ctx("http://other.com/news/index.html")).unwrap();
        let out = &result.html;

        assert!(out.contains(r#"href="http://other.com/css/site.css""#));
        assert!(out.contains(r#"src="http://other.com/news/app.js""#));
        assert!(out.contains(r#"href="http://a.com/proxy?link=http%3A%2F%2Fother.com%2Fp""#));
        assert!(out.contains(r#"href="http://a.com/p""#));
        assert!(out.contains(r##"href="#""##));
        assert!(out.contains(r#"src="http://other.com/i.png""#));

        assert_eq!(
            result.stats,
            RewriteStats {
                leave: 1,
                through_proxy: 1,
                direct: 3,
                dropped: 1,
            }
        );
        assert_eq!(result.stats.rewritten(), 4);
    }

    #[test]
    fn test_elements_without_attribute_untouched() {
        let html = r#"<a name="x">anchor</a><script>var a = 1;</script><img alt="none">"#;
        let result = rewrite_for_proxy(html, &ctx("http://other.com/")).unwrap();
        assert_eq!(result.html, html);
        assert_eq!(result.stats, RewriteStats::default());
    }

    #[test]
    fn test_entities_decoded_before_escaping() {
        let html = r#"<a href="list.html?a=1&amp;b=2">x</a>"#;
        let result = rewrite_for_proxy(html, &ctx("http://other.com/")).unwrap();
        assert!(
            result
                .html
                .contains("http://a.com/proxy?link=list.html%3Fa%3D1%26b%3D2")
        );
    }

    #[test]
    fn test_image_resolves_against_base_origin() {
        let html = r#"<img src="/logo.png">"#;
        let out = rewrite_for_proxy(html, &ctx("http://other.com/x/y.html")).unwrap();
        assert_eq!(out.html, r#"<img src="http://other.com/logo.png">"#);
    }
}
