//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5280                 # HTTP port number
//! path = "/proxy"             # Endpoint that takes `?link=`
//! public_url = "https://relay.example.com"  # Origin clients reach us at
//! workers = 0                 # Request threads (0 = one per core)
//! fallback_to_http = false    # Retry failed https fetches over http
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the relay reachable from LAN.
//!
//! Without `public_url` the proxy endpoint is derived from each request's
//! `Host` header.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    pub port: u16,

    /// Proxy endpoint path.
    pub path: String,

    /// Externally visible origin, for deployments behind a reverse proxy.
    pub public_url: Option<String>,

    /// Worker threads handling requests; `0` picks the core count.
    pub workers: usize,

    pub fallback_to_http: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5280,
            path: "/proxy".to_string(),
            public_url: None,
            workers: 0,
            fallback_to_http: false,
        }
    }
}

impl ServeConfig {
    /// Absolute endpoint URL for a request that arrived with `host`.
    pub fn endpoint(&self, host: Option<&str>) -> String {
        match (&self.public_url, host) {
            (Some(public), _) => format!("{}{}", public.trim_end_matches('/'), self.path),
            (None, Some(host)) => format!("http://{}{}", host, self.path),
            (None, None) => format!("http://{}:{}{}", self.interface, self.port, self.path),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.path.starts_with('/') || self.path == "/" {
            diag.error_with_hint(
                FieldPath::new("serve.path"),
                format!("`{}` is not a usable endpoint path", self.path),
                "use an absolute path other than `/`, e.g. `/proxy`",
            );
        }
        if self.path.contains(['?', '#']) {
            diag.error(
                FieldPath::new("serve.path"),
                "endpoint path must not carry a query or fragment",
            );
        }

        if let Some(public) = &self.public_url {
            match url::Url::parse(public) {
                Ok(url) if url.has_host() => {}
                _ => diag.error(
                    FieldPath::new("serve.public_url"),
                    format!("`{public}` is not an absolute url"),
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config = test_parse_config(
            "[serve]\ninterface = \"0.0.0.0\"\nport = 8080\npath = \"/go\"\nworkers = 4",
        );

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.path, "/go");
        assert_eq!(config.serve.workers, 4);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 5280);
        assert_eq!(config.serve.path, "/proxy");
        assert!(!config.serve.fallback_to_http);
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_endpoint() {
        let serve = ServeConfig::default();
        assert_eq!(serve.endpoint(None), "http://127.0.0.1:5280/proxy");
        assert_eq!(
            serve.endpoint(Some("relay.lan:5280")),
            "http://relay.lan:5280/proxy"
        );

        let public = ServeConfig {
            public_url: Some("https://relay.example.com/".into()),
            ..ServeConfig::default()
        };
        assert_eq!(
            public.endpoint(Some("10.0.0.2:5280")),
            "https://relay.example.com/proxy"
        );
    }

    #[test]
    fn test_serve_config_validate() {
        let mut diag = ConfigDiagnostics::new();
        ServeConfig::default().validate(&mut diag);
        assert!(diag.into_result().is_ok());

        for path in ["/", "proxy", "/p?x=1"] {
            let serve = ServeConfig {
                path: path.into(),
                ..ServeConfig::default()
            };
            let mut diag = ConfigDiagnostics::new();
            serve.validate(&mut diag);
            assert!(diag.into_result().is_err(), "{path}");
        }

        let serve = ServeConfig {
            public_url: Some("relay.example.com".into()),
            ..ServeConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        serve.validate(&mut diag);
        let report = diag.into_result().unwrap_err().to_string();
        assert!(report.contains("serve.public_url"));
        assert!(!report.ends_with("problems"));
    }
}
