//! The traced round trip.
//!
//! [`Transport::execute`] sends one [`RequestSpec`] and returns a
//! [`ResponseView`]. A fresh connection reports to the caller's
//! [`ConnectObserver`] as soon as TCP is up, before the request is written.

use crate::base::error::Error;
use crate::base::neterror::NetError;
use crate::config::TransportConfig;
use crate::http::streamfactory::HttpStream;
use crate::http::{RequestEcho, RequestSpec, ResponseBody, ResponseView, TlsVersion};
use crate::socket::connectjob::ConnectJob;
use crate::socket::observer::ConnectObserver;
use crate::socket::pool::{IdlePool, Poolable};
use crate::socket::proxy::ProxySettings;
use crate::socket::tls::TlsConfig;
use http::header::{HeaderValue, PROXY_AUTHORIZATION};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How long a pooled connection may take to report ready before it is
/// abandoned for a fresh one.
const IDLE_READY_TIMEOUT: Duration = Duration::from_millis(500);

/// A protocol stream plus the facts about the socket it runs on.
#[derive(Debug)]
struct Connection {
    stream: HttpStream,
    tls_version: TlsVersion,
}

impl Poolable for Connection {
    fn is_open(&self) -> bool {
        self.stream.is_open()
    }
}

/// HTTP transport with connection reuse, TLS policy and a connect hook.
#[derive(Debug, Clone)]
pub struct Transport {
    config: TransportConfig,
    tls: TlsConfig,
    proxy: Option<ProxySettings>,
    pool: Arc<IdlePool<Connection>>,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    /// Transport with the fixed defaults of [`TransportConfig`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn tls_config(&self) -> &TlsConfig {
        &self.tls
    }

    /// Number of idle connections held for reuse.
    pub fn idle_count(&self) -> usize {
        self.pool.idle_count()
    }

    /// Perform the round trip for `spec`.
    ///
    /// A TCP connect failure comes back as [`Error::Connect`], which callers
    /// must treat as terminal. Everything else that goes wrong is an
    /// [`Error::Exec`] or [`Error::Build`].
    pub async fn execute(
        &self,
        spec: RequestSpec,
        observer: &mut dyn ConnectObserver,
    ) -> Result<ResponseView, Error> {
        let url = spec.url().clone();
        let exec = |source: NetError| Error::Exec {
            url: url.to_string(),
            source,
        };

        let proxy = match &self.proxy {
            Some(fixed) => Some(fixed.clone()),
            None if self.config.proxy_from_env => ProxySettings::from_env(&url),
            None => None,
        };

        let mut conn = match self.reuse(&url).await {
            Some(conn) => conn,
            None => {
                let socket = ConnectJob::new(&self.config, &self.tls)
                    .connect(&url, proxy.as_ref(), observer)
                    .await?;
                let tls_version = socket.tls_version();
                let stream = HttpStream::handshake(socket).await.map_err(exec)?;
                Connection {
                    stream,
                    tls_version,
                }
            }
        };

        let version = conn.stream.version();
        let echo = RequestEcho {
            method: spec.method().clone(),
            version,
            host: spec.host(),
            user_agent: spec.user_agent().map(str::to_string),
            accept: spec.accept().map(str::to_string),
        };

        // Plain HTTP through a forwarding proxy goes out in absolute-form.
        let forward_proxy = proxy.as_ref().filter(|_| url.scheme() == "http");
        let mut req = spec.into_http(version, forward_proxy.is_some())?;
        if let Some(auth) = forward_proxy.and_then(ProxySettings::get_auth_header) {
            let value = HeaderValue::from_str(&auth).map_err(|_| exec(NetError::InvalidHeader))?;
            req.headers_mut().insert(PROXY_AUTHORIZATION, value);
        }

        tracing::debug!(
            method = %echo.method,
            url = %url,
            version = ?version,
            "sending request"
        );

        conn.stream.ready().await.map_err(exec)?;
        let resp = conn.stream.send_request(req).await.map_err(exec)?;
        let (parts, body) = resp.into_parts();

        tracing::debug!(status = %parts.status, version = ?parts.version, "response headers received");

        let tls_version = conn.tls_version.clone();
        self.pool.checkin(&url, conn);

        Ok(ResponseView::new(
            parts.status,
            parts.version,
            parts.headers,
            tls_version,
            echo,
            ResponseBody::from_incoming(body),
        ))
    }

    /// A pooled connection for `url` that is ready for a request, if any.
    async fn reuse(&self, url: &Url) -> Option<Connection> {
        while let Some(mut conn) = self.pool.checkout(url) {
            match tokio::time::timeout(IDLE_READY_TIMEOUT, conn.stream.ready()).await {
                Ok(Ok(())) => return Some(conn),
                _ => tracing::debug!(url = %url, "discarding idle connection"),
            }
        }
        None
    }
}

/// Builder for [`Transport`]. The CLI only ever uses the defaults.
#[derive(Debug, Default)]
pub struct TransportBuilder {
    config: TransportConfig,
    proxy: Option<ProxySettings>,
}

impl TransportBuilder {
    pub fn config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_idle_conns(mut self, max: usize) -> Self {
        self.config.max_idle_conns = max;
        self
    }

    pub fn idle_conn_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_conn_timeout = timeout;
        self
    }

    pub fn tls_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.tls_handshake_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Offer `h2` during ALPN.
    pub fn http2(mut self, enabled: bool) -> Self {
        self.config.force_http2 = enabled;
        self
    }

    pub fn proxy_from_env(mut self, enabled: bool) -> Self {
        self.config.proxy_from_env = enabled;
        self
    }

    /// Route every request through `proxy`, ignoring the environment.
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn build(self) -> Transport {
        let tls = TlsConfig::with_http2(self.config.force_http2);
        let pool = Arc::new(IdlePool::new(
            self.config.max_idle_conns,
            self.config.idle_conn_timeout,
        ));
        Transport {
            config: self.config,
            tls,
            proxy: self.proxy,
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let transport = Transport::new();
        assert_eq!(transport.config().max_idle_conns, 100);
        assert_eq!(transport.config().idle_conn_timeout, Duration::from_secs(90));
        assert_eq!(transport.tls_config().alpn_protos.len(), 2);
        assert_eq!(transport.idle_count(), 0);
    }

    #[test]
    fn test_builder_overrides() {
        let transport = Transport::builder()
            .http2(false)
            .connect_timeout(Duration::from_millis(200))
            .proxy_from_env(false)
            .build();
        assert_eq!(transport.tls_config().alpn_protos, vec!["http/1.1".to_string()]);
        assert_eq!(transport.config().connect_timeout, Duration::from_millis(200));
        assert!(!transport.config().proxy_from_env);
    }
}
