//! Completed response as handed to the renderer.

use crate::http::ResponseBody;
use http::{HeaderMap, Method, StatusCode, Version};
use std::fmt;

/// Negotiated TLS protocol version of the connection that carried a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsVersion {
    /// No TLS: plain TCP.
    None,
    Tls12,
    Tls13,
    /// Any other negotiated version, by the name the TLS library reports.
    Other(String),
}

impl TlsVersion {
    pub fn label(&self) -> &str {
        match self {
            TlsVersion::None => "plaintext",
            TlsVersion::Tls12 => "TLSv1.2",
            TlsVersion::Tls13 => "TLSv1.3",
            TlsVersion::Other(name) => name,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the request looked like on the wire, for the connect-info echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEcho {
    pub method: Method,
    pub version: Version,
    pub host: String,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
}

/// A completed response. Owns the body until the renderer consumes it.
#[derive(Debug)]
pub struct ResponseView {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    tls_version: TlsVersion,
    request: RequestEcho,
    body: ResponseBody,
}

impl ResponseView {
    pub fn new(
        status: StatusCode,
        version: Version,
        headers: HeaderMap,
        tls_version: TlsVersion,
        request: RequestEcho,
        body: ResponseBody,
    ) -> Self {
        Self {
            status,
            version,
            headers,
            tls_version,
            request,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn tls_version(&self) -> &TlsVersion {
        &self.tls_version
    }

    pub fn request(&self) -> &RequestEcho {
        &self.request
    }

    /// Split off the body; the metadata stays readable.
    pub fn into_parts(self) -> (ResponseMeta, ResponseBody) {
        (
            ResponseMeta {
                status: self.status,
                version: self.version,
                headers: self.headers,
                tls_version: self.tls_version,
                request: self.request,
            },
            self.body,
        )
    }
}

/// Everything in a [`ResponseView`] except the body.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub tls_version: TlsVersion,
    pub request: RequestEcho,
}
