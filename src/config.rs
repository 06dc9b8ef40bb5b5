//! Invocation and transport configuration.
//!
//! [`DiagConfig`] is built once by the CLI layer and passed by reference into
//! the pipeline. [`TransportConfig`] carries the fixed transport defaults.

use http::Method;
use std::time::Duration;
use url::Url;

/// Default `User-Agent` sent when the caller has not supplied one.
pub const DEFAULT_USER_AGENT: &str = concat!("netpeek/", env!("CARGO_PKG_VERSION"));

/// Everything one invocation needs.
#[derive(Debug, Clone)]
pub struct DiagConfig {
    pub method: Method,
    pub url: Url,
    /// Request body; empty means no body.
    pub body: String,
    /// Extra request headers, attached in order before dispatch.
    pub headers: Vec<(String, String)>,
    pub show_connect_info: bool,
    pub show_full_body: bool,
}

impl DiagConfig {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: String::new(),
            headers: Vec::new(),
            show_connect_info: false,
            show_full_body: false,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_connect_info: self.show_connect_info,
            show_full_body: self.show_full_body,
        }
    }
}

/// Flags consumed by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_connect_info: bool,
    pub show_full_body: bool,
}

/// Transport parameters. The defaults are the only values the CLI uses.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Cap on idle connections kept for reuse, across all hosts.
    pub max_idle_conns: usize,
    /// Idle connections older than this are discarded.
    pub idle_conn_timeout: Duration,
    /// TLS handshake must complete within this window.
    pub tls_handshake_timeout: Duration,
    /// Upper bound on waiting for `100 Continue`.
    pub expect_continue_timeout: Duration,
    /// Bound on a single TCP connect attempt.
    pub connect_timeout: Duration,
    /// Offer `h2` in ALPN.
    pub force_http2: bool,
    /// Pick a proxy from `HTTP(S)_PROXY` / `NO_PROXY`.
    pub proxy_from_env: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_idle_conns: 100,
            idle_conn_timeout: Duration::from_secs(90),
            tls_handshake_timeout: Duration::from_secs(10),
            expect_continue_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(30),
            force_http2: true,
            proxy_from_env: true,
        }
    }
}
