//! Proxy selection from the environment.
//!
//! `http` targets read `HTTP_PROXY` / `http_proxy`, `https` targets read
//! `HTTPS_PROXY` / `https_proxy`. `NO_PROXY` / `no_proxy` lists hosts that
//! go direct: domains (with or without a leading dot), IP addresses, CIDR
//! ranges, or `*`. `localhost` and loopback addresses always go direct.

use std::net::IpAddr;
use url::Url;
use zeroize::Zeroizing;

/// Proxy protocol type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    /// HTTP proxy (CONNECT for HTTPS targets, absolute-form for HTTP).
    Http,
    /// HTTPS proxy (TLS to proxy)
    Https,
    /// SOCKS5 proxy
    Socks5,
}

/// A proxy chosen for one target.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Proxy URL (e.g., `http://proxy.com:8080`)
    pub url: Url,
    pub username: Option<String>,
    /// Proxy password (zeroized on drop)
    pub password: Option<Zeroizing<String>>,
}

impl ProxySettings {
    /// Parse a proxy URL. A bare `host:port` is taken as an HTTP proxy.
    /// Credentials in the URL become proxy credentials.
    pub fn new(url_str: &str) -> Option<Self> {
        let url = match Url::parse(url_str) {
            Ok(u) if u.host_str().is_some() => u,
            _ => Url::parse(&format!("http://{}", url_str)).ok()?,
        };
        let username = Some(url.username().to_string()).filter(|u| !u.is_empty());
        let password = url.password().map(|p| Zeroizing::new(p.to_string()));
        Some(Self {
            url,
            username,
            password,
        })
    }

    /// Proxy for `target` according to the process environment.
    pub fn from_env(target: &Url) -> Option<Self> {
        Self::from_lookup(target, |key| std::env::var(key).ok())
    }

    /// Proxy for `target` according to `lookup`, which maps variable names
    /// to values.
    pub fn from_lookup<F>(target: &Url, lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys: [&str; 2] = match target.scheme() {
            "https" => ["HTTPS_PROXY", "https_proxy"],
            "http" => ["HTTP_PROXY", "http_proxy"],
            _ => return None,
        };
        let raw = keys
            .iter()
            .find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()))?;

        if target.host_str().is_some_and(is_local_host) {
            return None;
        }

        let no_proxy = lookup("NO_PROXY")
            .or_else(|| lookup("no_proxy"))
            .unwrap_or_default();
        if NoProxy::parse(&no_proxy).matches_url(target) {
            tracing::debug!(target = %target, "proxy bypassed by NO_PROXY");
            return None;
        }

        let settings = Self::new(raw.trim())?;
        tracing::debug!(proxy = %settings.url, target = %target, "using proxy from environment");
        Some(settings)
    }

    /// Get proxy type from URL scheme.
    pub fn proxy_type(&self) -> ProxyType {
        match self.url.scheme() {
            "https" => ProxyType::Https,
            "socks5" | "socks5h" | "socks4" | "socks4a" => ProxyType::Socks5,
            _ => ProxyType::Http,
        }
    }

    /// Get `Proxy-Authorization` header value for HTTP proxies. A username
    /// without a password authenticates with an empty password.
    pub fn get_auth_header(&self) -> Option<String> {
        use base64::{engine::general_purpose, Engine as _};
        let user = self.username.as_ref()?;
        let pass = self.password.as_ref().map_or("", |p| p.as_str());
        let creds = Zeroizing::new(format!("{}:{}", user, pass));
        let encoded = general_purpose::STANDARD.encode(creds.as_bytes());
        Some(format!("Basic {}", encoded))
    }

    /// Get proxy host and port.
    pub fn host_port(&self) -> Option<(&str, u16)> {
        let host = self.url.host_str()?;
        let port = self.url.port().unwrap_or(match self.proxy_type() {
            ProxyType::Http => 80,
            ProxyType::Https => 443,
            ProxyType::Socks5 => 1080,
        });
        Some((host, port))
    }
}

/// Parsed `NO_PROXY` list.
#[derive(Debug, Clone, Default)]
pub struct NoProxy {
    entries: Vec<NoProxyEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NoProxyEntry {
    Any,
    Domain(String),
    Ip(IpAddr),
    Cidr(IpAddr, u8),
}

impl NoProxy {
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                if part == "*" {
                    return NoProxyEntry::Any;
                }
                if let Some((ip, prefix)) = part.split_once('/') {
                    if let (Ok(ip), Ok(prefix)) = (ip.parse::<IpAddr>(), prefix.parse::<u8>()) {
                        return NoProxyEntry::Cidr(ip, prefix);
                    }
                }
                match part.parse::<IpAddr>() {
                    Ok(ip) => NoProxyEntry::Ip(ip),
                    Err(_) => NoProxyEntry::Domain(
                        part.trim_start_matches('.').to_ascii_lowercase(),
                    ),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let ip = host.parse::<IpAddr>().ok();
        let host = host.to_ascii_lowercase();

        self.entries.iter().any(|entry| match (entry, ip) {
            (NoProxyEntry::Any, _) => true,
            (NoProxyEntry::Ip(want), Some(ip)) => *want == ip,
            (NoProxyEntry::Cidr(net, prefix), Some(ip)) => cidr_contains(*net, *prefix, ip),
            (NoProxyEntry::Domain(domain), None) => {
                host == *domain
                    || host
                        .strip_suffix(domain.as_str())
                        .is_some_and(|rest| rest.ends_with('.'))
            }
            _ => false,
        })
    }

    pub fn matches_url(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|h| self.matches(h))
    }
}

/// `localhost` or a loopback IP literal.
fn is_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

fn cidr_contains(network: IpAddr, prefix: u8, addr: IpAddr) -> bool {
    match (network, addr) {
        (IpAddr::V4(net), IpAddr::V4(ip)) if prefix <= 32 => {
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            u32::from(net) & mask == u32::from(ip) & mask
        }
        (IpAddr::V6(net), IpAddr::V6(ip)) if prefix <= 128 => {
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            u128::from(net) & mask == u128::from(ip) & mask
        }
        _ => false,
    }
}
