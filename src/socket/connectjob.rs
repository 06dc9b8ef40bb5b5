use crate::base::error::Error;
use crate::base::neterror::NetError;
use crate::config::TransportConfig;
use crate::http::request::host_header;
use crate::socket::client::SocketType;
use crate::socket::observer::{ConnectObserver, ConnectionEvent};
use crate::socket::proxy::{ProxySettings, ProxyType};
use crate::socket::tls::{server_name, TlsConfig};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Largest CONNECT response head we accept from a proxy.
const MAX_TUNNEL_RESPONSE: usize = 8 * 1024;

/// Manages the connection process: DNS -> TCP -> (CONNECT) -> SSL.
///
/// The observer hears about the TCP connect exactly once. A failed TCP
/// connect is reported as [`Error::Connect`]; every later failure is an
/// [`Error::Exec`].
pub struct ConnectJob<'a> {
    config: &'a TransportConfig,
    tls: &'a TlsConfig,
}

impl<'a> ConnectJob<'a> {
    pub fn new(config: &'a TransportConfig, tls: &'a TlsConfig) -> Self {
        Self { config, tls }
    }

    pub async fn connect(
        &self,
        url: &Url,
        proxy: Option<&ProxySettings>,
        observer: &mut dyn ConnectObserver,
    ) -> Result<SocketType, Error> {
        let exec = |source: NetError| Error::Exec {
            url: url.to_string(),
            source,
        };

        let (host, port) = match proxy {
            Some(p) => {
                if p.proxy_type() != ProxyType::Http {
                    tracing::warn!(proxy = %p.url, "unsupported proxy scheme");
                    return Err(exec(NetError::ProxyConnectionFailed));
                }
                p.host_port().ok_or_else(|| exec(NetError::InvalidUrl))?
            }
            None => {
                let host = url.host_str().ok_or_else(|| exec(NetError::InvalidUrl))?;
                let port = url
                    .port_or_known_default()
                    .ok_or_else(|| exec(NetError::InvalidUrl))?;
                (host, port)
            }
        };

        // 1. DNS Resolution
        let lookup_host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((lookup_host, port))
            .await
            .map_err(|e| {
                tracing::debug!(host = %host, error = %e, "DNS resolution failed");
                exec(NetError::NameNotResolved)
            })?
            .collect();
        if addrs.is_empty() {
            return Err(exec(NetError::NameNotResolved));
        }
        tracing::debug!(host = %host, count = addrs.len(), "DNS resolution complete");

        // 2. TCP Connect (to proxy or destination)
        let stream = self.connect_tcp(&addrs, observer).await?;

        // 3. Proxy Handshake (HTTP CONNECT) for TLS targets
        let is_https = url.scheme() == "https";
        let stream = match proxy {
            Some(p) if is_https => establish_tunnel(stream, url, p).await.map_err(exec)?,
            _ => stream,
        };

        // 4. SSL Handshake (if https), always after any tunnel
        if !is_https {
            return Ok(SocketType::Tcp(stream));
        }

        let host = host_header(url);
        let name = server_name(&host);
        let config = self.tls.configure(name).map_err(exec)?;

        let handshake = tokio_boring::connect(config, name, stream);
        match timeout(self.config.tls_handshake_timeout, handshake).await {
            Ok(Ok(tls_stream)) => {
                tracing::debug!(
                    server_name = %name,
                    version = tls_stream.ssl().version_str(),
                    "TLS handshake complete"
                );
                Ok(SocketType::Ssl(tls_stream))
            }
            Ok(Err(e)) => {
                tracing::debug!(server_name = %name, error = ?e, "TLS handshake failed");
                Err(exec(NetError::SslProtocolError))
            }
            Err(_) => {
                tracing::debug!(server_name = %name, "TLS handshake timed out");
                Err(exec(NetError::ConnectionTimedOut))
            }
        }
    }

    /// Try each resolved address in order; report the outcome to the observer.
    async fn connect_tcp(
        &self,
        addrs: &[SocketAddr],
        observer: &mut dyn ConnectObserver,
    ) -> Result<TcpStream, Error> {
        let mut last = (addrs[0], NetError::ConnectionFailed);

        for &addr in addrs {
            match timeout(self.config.connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        tracing::debug!(addr = %addr, error = %e, "failed to set TCP_NODELAY");
                    }
                    let peer = stream.peer_addr().unwrap_or(addr);
                    tracing::debug!(peer = %peer, "TCP connected");
                    observer.on_connect(&ConnectionEvent::connected(peer.to_string()));
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    tracing::debug!(addr = %addr, error = %e, "TCP connect failed");
                    last = (addr, NetError::from_io(&e));
                }
                Err(_) => {
                    tracing::debug!(addr = %addr, "TCP connect timed out");
                    last = (addr, NetError::ConnectionTimedOut);
                }
            }
        }

        let (addr, source) = last;
        observer.on_connect(&ConnectionEvent::failed(addr.to_string(), source));
        Err(Error::Connect {
            addr: addr.to_string(),
            source,
        })
    }
}

/// Issue `CONNECT host:port` and wait for a 2xx from the proxy.
async fn establish_tunnel(
    mut stream: TcpStream,
    url: &Url,
    proxy: &ProxySettings,
) -> Result<TcpStream, NetError> {
    let target_host = url.host_str().ok_or(NetError::InvalidUrl)?;
    let target_port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;
    let target = format!("{}:{}", target_host, target_port);

    let mut connect_req = format!("CONNECT {} HTTP/1.1\r\nHost: {}\r\n", target, target);
    if let Some(auth) = proxy.get_auth_header() {
        connect_req.push_str(&format!("Proxy-Authorization: {}\r\n", auth));
    }
    connect_req.push_str("\r\n");

    stream
        .write_all(connect_req.as_bytes())
        .await
        .map_err(|_| NetError::TunnelConnectionFailed)?;

    let mut head = Vec::with_capacity(256);
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream
            .read(&mut buf)
            .await
            .map_err(|_| NetError::TunnelConnectionFailed)?;
        if n == 0 || head.len() + n > MAX_TUNNEL_RESPONSE {
            return Err(NetError::TunnelConnectionFailed);
        }
        head.extend_from_slice(&buf[..n]);
    }

    let status_line = String::from_utf8_lossy(&head);
    let status_line = status_line.lines().next().unwrap_or_default();
    if !tunnel_accepted(status_line) {
        tracing::debug!(proxy = %proxy.url, status = %status_line, "proxy refused tunnel");
        return Err(NetError::TunnelConnectionFailed);
    }
    tracing::debug!(proxy = %proxy.url, target = %target, "tunnel established");
    Ok(stream)
}

fn tunnel_accepted(status_line: &str) -> bool {
    let mut parts = status_line.split_whitespace();
    matches!(parts.next(), Some("HTTP/1.1") | Some("HTTP/1.0"))
        && parts.next().is_some_and(|code| code.len() == 3 && code.starts_with('2'))
}
