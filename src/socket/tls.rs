use crate::base::neterror::NetError;
use boring::ssl::{
    ConnectConfiguration, SslConnector, SslConnectorBuilder, SslMethod, SslVerifyMode, SslVersion,
};

/// Client TLS policy applied to `https` connections.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub min_version: Option<SslVersion>,
    pub alpn_protos: Vec<String>,
    /// Peer certificate and hostname verification. Never disabled by the CLI.
    pub verify_peer: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self::with_http2(true)
    }
}

impl TlsConfig {
    /// TLS 1.2 floor, peer verification on, ALPN offering `h2` when asked.
    pub fn with_http2(http2: bool) -> Self {
        let alpn_protos = if http2 {
            vec!["h2".to_string(), "http/1.1".to_string()]
        } else {
            vec!["http/1.1".to_string()]
        };
        Self {
            min_version: Some(SslVersion::TLS1_2),
            alpn_protos,
            verify_peer: true,
        }
    }

    /// ALPN protocol list in wire format (length-prefixed).
    pub fn alpn_wire(&self) -> Result<Vec<u8>, NetError> {
        let mut alpn_wire = Vec::new();
        for proto in &self.alpn_protos {
            if proto.is_empty() || proto.len() > 255 {
                return Err(NetError::SslProtocolError);
            }
            alpn_wire.push(proto.len() as u8);
            alpn_wire.extend_from_slice(proto.as_bytes());
        }
        Ok(alpn_wire)
    }

    /// Apply this configuration to an SSL connector builder.
    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), NetError> {
        builder
            .set_min_proto_version(self.min_version)
            .map_err(|_| NetError::SslProtocolError)?;

        if !self.alpn_protos.is_empty() {
            builder
                .set_alpn_protos(&self.alpn_wire()?)
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if self.verify_peer {
            builder.set_verify(SslVerifyMode::PEER);
        } else {
            builder.set_verify(SslVerifyMode::NONE);
        }
        Ok(())
    }

    /// Per-connection configuration for `server_name`.
    pub fn configure(&self, server_name: &str) -> Result<ConnectConfiguration, NetError> {
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        self.apply_to_builder(&mut builder)?;

        let mut config = builder
            .build()
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        config.set_use_server_name_indication(Self::should_set_sni(server_name));
        config.set_verify_hostname(self.verify_peer);
        Ok(config)
    }

    /// Check if SNI (Server Name Indication) should be set for this host.
    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        host.parse::<std::net::IpAddr>().is_err()
    }
}

/// Server name for certificate validation: the request host with any port
/// stripped. IPv6 brackets are removed.
pub fn server_name(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &rest[..end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = TlsConfig::default();
        assert_eq!(config.min_version, Some(SslVersion::TLS1_2));
        assert!(config.verify_peer);
        assert_eq!(config.alpn_protos, vec!["h2".to_string(), "http/1.1".to_string()]);
    }

    #[test]
    fn test_http1_only_alpn() {
        let config = TlsConfig::with_http2(false);
        assert_eq!(config.alpn_wire().unwrap(), b"\x08http/1.1".to_vec());
    }

    #[test]
    fn test_alpn_wire_format() {
        let config = TlsConfig::default();
        assert_eq!(config.alpn_wire().unwrap(), b"\x02h2\x08http/1.1".to_vec());
    }

    #[test]
    fn test_apply_to_builder() {
        let mut builder = SslConnector::builder(SslMethod::tls()).unwrap();
        assert!(TlsConfig::default().apply_to_builder(&mut builder).is_ok());
    }

    #[test]
    fn test_configure_for_host() {
        assert!(TlsConfig::default().configure("example.com").is_ok());
        assert!(TlsConfig::default().configure("127.0.0.1").is_ok());
    }

    #[test]
    fn test_sni_skipped_for_ip() {
        assert!(TlsConfig::should_set_sni("example.com"));
        assert!(!TlsConfig::should_set_sni("192.168.1.1"));
        assert!(!TlsConfig::should_set_sni("::1"));
    }

    #[test]
    fn test_server_name_strips_port() {
        assert_eq!(server_name("example.com:8443"), "example.com");
        assert_eq!(server_name("example.com"), "example.com");
        assert_eq!(server_name("[::1]:443"), "::1");
        assert_eq!(server_name("[::1]"), "::1");
        assert_eq!(server_name("::1"), "::1");
    }
}
