//! Outbound request construction.

use crate::base::error::BuildError;
use crate::config::DEFAULT_USER_AGENT;
use crate::http::RequestBody;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, HOST, USER_AGENT};
use http::{HeaderMap, Method, Request, Version};
use http_body_util::Full;
use url::Url;

/// An immutable, fully-validated request, consumed once by the transport.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: RequestBody,
}

impl RequestSpec {
    /// Build a request from a method token, an absolute URL and a body string.
    ///
    /// An empty body string still yields a readable (empty) body.
    pub fn build(method: &str, url: &Url, body: &str) -> Result<Self, BuildError> {
        RequestBuilder::new(method, url.clone()).body(body).build()
    }

    pub fn builder(method: &str, url: Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// `host[:port]` as it goes on the wire; the port is omitted when it is
    /// the scheme default.
    pub fn host(&self) -> String {
        host_header(&self.url)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }

    pub fn accept(&self) -> Option<&str> {
        self.headers.get(ACCEPT).and_then(|v| v.to_str().ok())
    }

    /// Convert into a hyper request for the given protocol version.
    ///
    /// HTTP/1.1 uses origin-form unless `absolute_form` is set (plain HTTP
    /// through a forwarding proxy). HTTP/2 always carries scheme and authority.
    pub(crate) fn into_http(
        self,
        version: Version,
        absolute_form: bool,
    ) -> Result<Request<Full<Bytes>>, BuildError> {
        let target = if version == Version::HTTP_2 || absolute_form {
            format!(
                "{}://{}{}",
                self.url.scheme(),
                host_header(&self.url),
                origin_form(&self.url)
            )
        } else {
            origin_form(&self.url)
        };

        let mut req = Request::builder()
            .method(self.method.clone())
            .uri(target)
            .version(version)
            .body(self.body.into_full())
            .map_err(|e| BuildError::new(self.method.as_str(), self.url.as_str(), e))?;

        let mut headers = self.headers;
        if version != Version::HTTP_2 && !headers.contains_key(HOST) {
            let host = HeaderValue::from_str(&host_header(&self.url))
                .map_err(|e| BuildError::new(self.method.as_str(), self.url.as_str(), e))?;
            headers.insert(HOST, host);
        }
        *req.headers_mut() = headers;
        Ok(req)
    }
}

/// Builder for [`RequestSpec`]. Errors are deferred to [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: String,
    url: Url,
    body: RequestBody,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.to_string(),
            url,
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    pub fn body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header. A repeated name keeps every value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Result<RequestSpec, BuildError> {
        let fail = |cause: &dyn std::fmt::Display| {
            BuildError::new(self.method.as_str(), self.url.as_str(), cause)
        };

        if self.method.is_empty() {
            return Err(fail(&"empty HTTP method"));
        }
        let method = Method::from_bytes(self.method.as_bytes()).map_err(|e| fail(&e))?;

        match self.url.scheme() {
            "http" | "https" => {}
            other => return Err(fail(&format!("unsupported protocol scheme {:?}", other))),
        }
        if self.url.host_str().map_or(true, str::is_empty) {
            return Err(fail(&"no Host in request URL"));
        }

        let mut headers = HeaderMap::with_capacity(self.headers.len() + 1);
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| fail(&e))?;
            let value = HeaderValue::from_str(value.trim()).map_err(|e| fail(&e))?;
            headers.append(name, value);
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        // URL userinfo never goes on the wire as part of the target.
        if let Some(auth) = basic_auth(&self.url) {
            if !headers.contains_key(AUTHORIZATION) {
                let value = HeaderValue::from_str(&auth).map_err(|e| fail(&e))?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        tracing::debug!(method = %method, url = %self.url, "request built");

        Ok(RequestSpec {
            method,
            url: self.url,
            headers,
            body: self.body,
        })
    }
}

/// `host[:port]`, omitting the scheme-default port.
pub fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// `Basic` credentials from the URL's userinfo, if it has a username.
fn basic_auth(url: &Url) -> Option<String> {
    use base64::{engine::general_purpose, Engine as _};
    if url.username().is_empty() {
        return None;
    }
    let creds = format!("{}:{}", url.username(), url.password().unwrap_or_default());
    Some(format!("Basic {}", general_purpose::STANDARD.encode(creds)))
}

fn origin_form(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_build_sets_default_user_agent() {
        let spec = RequestSpec::build("GET", &url("https://example.com"), "").unwrap();
        assert_eq!(spec.method(), &Method::GET);
        assert_eq!(spec.user_agent(), Some(DEFAULT_USER_AGENT));
        assert!(spec.accept().is_none());
    }

    #[test]
    fn test_caller_user_agent_wins() {
        let spec = RequestSpec::builder("GET", url("http://example.com"))
            .header("User-Agent", "curl/7.77.0")
            .build()
            .unwrap();
        assert_eq!(spec.user_agent(), Some("curl/7.77.0"));
        assert_eq!(spec.headers().get_all(USER_AGENT).iter().count(), 1);
    }

    #[test]
    fn test_empty_body_is_readable() {
        let spec = RequestSpec::build("POST", &url("http://example.com"), "").unwrap();
        assert_eq!(spec.body(), &RequestBody::Empty);
        assert_eq!(spec.body().as_bytes().len(), 0);
    }

    #[test]
    fn test_malformed_method_fails_with_cause() {
        let err = RequestSpec::build("GE T", &url("http://example.com"), "").unwrap_err();
        assert_eq!(err.method, "GE T");
        assert!(!err.cause.is_empty());
        assert!(err.to_string().contains(&err.cause));
    }

    #[test]
    fn test_empty_method_fails() {
        assert!(RequestSpec::build("", &url("http://example.com"), "").is_err());
    }

    #[test]
    fn test_unsupported_scheme_fails() {
        let err = RequestSpec::build("GET", &url("ftp://example.com"), "").unwrap_err();
        assert!(err.cause.contains("ftp"));
    }

    #[test]
    fn test_invalid_header_fails() {
        let res = RequestSpec::builder("GET", url("http://example.com"))
            .header("Bad Name", "v")
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn test_repeated_header_keeps_values() {
        let spec = RequestSpec::builder("GET", url("http://example.com"))
            .header("X-Trace", "a")
            .header("X-Trace", "b")
            .build()
            .unwrap();
        let values: Vec<_> = spec.headers().get_all("x-trace").iter().collect();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_host_header_port() {
        assert_eq!(host_header(&url("https://example.com:443/")), "example.com");
        assert_eq!(host_header(&url("http://example.com:8080/")), "example.com:8080");
        assert_eq!(host_header(&url("http://[::1]:8080/")), "[::1]:8080");
    }

    #[test]
    fn test_into_http_origin_form() {
        let spec = RequestSpec::build("GET", &url("http://example.com:8080/a/b?q=1"), "").unwrap();
        let req = spec.into_http(Version::HTTP_11, false).unwrap();
        assert_eq!(req.uri(), "/a/b?q=1");
        assert_eq!(req.headers().get(HOST).unwrap(), "example.com:8080");
    }

    #[test]
    fn test_into_http_absolute_form() {
        let spec = RequestSpec::build("GET", &url("http://example.com/x"), "").unwrap();
        let req = spec.into_http(Version::HTTP_11, true).unwrap();
        assert_eq!(req.uri(), "http://example.com/x");
    }

    #[test]
    fn test_userinfo_becomes_authorization() {
        let spec =
            RequestSpec::build("GET", &url("http://u:p@example.com:8080/a?b=c#frag"), "").unwrap();
        assert_eq!(spec.headers().get(AUTHORIZATION).unwrap(), "Basic dTpw");

        let req = spec.clone().into_http(Version::HTTP_11, true).unwrap();
        assert_eq!(req.uri(), "http://example.com:8080/a?b=c");

        let req = spec.into_http(Version::HTTP_2, false).unwrap();
        assert_eq!(req.uri(), "http://example.com:8080/a?b=c");
    }

    #[test]
    fn test_explicit_authorization_kept() {
        let spec = RequestSpec::builder("GET", url("https://u:p@example.com/"))
            .header("Authorization", "Bearer t")
            .build()
            .unwrap();
        assert_eq!(spec.headers().get(AUTHORIZATION).unwrap(), "Bearer t");
    }

    #[test]
    fn test_into_http2_has_no_host_header() {
        let spec = RequestSpec::build("GET", &url("https://example.com/"), "").unwrap();
        let req = spec.into_http(Version::HTTP_2, false).unwrap();
        assert_eq!(req.version(), Version::HTTP_2);
        assert!(req.headers().get(HOST).is_none());
        assert_eq!(req.uri().authority().unwrap(), "example.com");
    }
}
