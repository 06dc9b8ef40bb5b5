//! Response body streaming.
//!
//! A [`ResponseBody`] has a single consumer. Reading takes it by value, and
//! the underlying stream is released when the value is dropped, whichever
//! path the caller leaves by.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http_body::Body;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;

pub struct ResponseBody {
    inner: UnsyncBoxBody<Bytes, NetError>,
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody")
            .field("size_hint", &self.inner.size_hint())
            .finish()
    }
}

impl ResponseBody {
    /// Wrap any body whose errors can be displayed.
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: std::fmt::Display,
    {
        let inner = body
            .map_err(|e| {
                tracing::debug!(error = %e, "response body read failed");
                NetError::HttpBodyError
            })
            .boxed_unsync();
        Self { inner }
    }

    pub fn from_incoming(body: Incoming) -> Self {
        Self::new(body)
    }

    pub fn from_bytes<B: Into<Bytes>>(bytes: B) -> Self {
        Self::new(Full::new(bytes.into()))
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// Read the entire body.
    pub async fn bytes(self) -> Result<Bytes, NetError> {
        let collected = self.inner.collect().await?;
        Ok(collected.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use http_body::Frame;
    use http_body_util::StreamBody;

    #[tokio::test]
    async fn test_from_bytes() {
        let body = ResponseBody::from_bytes("hello");
        assert_eq!(body.bytes().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_empty() {
        assert!(ResponseBody::empty().bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chunks_are_concatenated() {
        let chunks: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"line 1\n"))),
            Ok(Frame::data(Bytes::from_static(b"line 2\n"))),
        ];
        let body = ResponseBody::new(StreamBody::new(stream::iter(chunks)));
        assert_eq!(&body.bytes().await.unwrap()[..], b"line 1\nline 2\n");
    }

    #[tokio::test]
    async fn test_read_error_maps_to_body_error() {
        let chunks: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"partial"))),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let body = ResponseBody::new(StreamBody::new(stream::iter(chunks)));
        assert_eq!(body.bytes().await.unwrap_err(), NetError::HttpBodyError);
    }
}
