//! Request body.
//!
//! A request always carries a readable body. "No body" is an empty stream,
//! never an absent one.

use bytes::Bytes;
use http_body_util::Full;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// Zero-length body.
    #[default]
    Empty,
    /// Body with raw bytes.
    Bytes(Bytes),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        if s.is_empty() {
            RequestBody::Empty
        } else {
            RequestBody::Bytes(Bytes::from(s))
        }
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::from(s.to_owned())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        if v.is_empty() {
            RequestBody::Empty
        } else {
            RequestBody::Bytes(Bytes::from(v))
        }
    }
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
        }
    }

    /// Bytes of the body; empty for [`RequestBody::Empty`].
    pub fn as_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b.clone(),
        }
    }

    /// Convert into a hyper-compatible body stream.
    pub fn into_full(self) -> Full<Bytes> {
        match self {
            RequestBody::Empty => Full::new(Bytes::new()),
            RequestBody::Bytes(b) => Full::new(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body::Body;
    use http_body_util::BodyExt;

    #[test]
    fn test_empty_string_is_empty_body() {
        let body: RequestBody = "".into();
        assert_eq!(body, RequestBody::Empty);
        assert!(body.is_empty());
    }

    #[test]
    fn test_bytes_body() {
        let body: RequestBody = "hello".into();
        assert!(!body.is_empty());
        assert_eq!(body.len(), 5);
        assert_eq!(body.as_bytes(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_from_vec() {
        let body: RequestBody = vec![1u8, 2, 3, 4].into();
        assert_eq!(body.len(), 4);
        let empty: RequestBody = Vec::new().into();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_into_full_size_hint() {
        let full = RequestBody::from("test").into_full();
        assert_eq!(full.size_hint().exact(), Some(4));
    }

    #[tokio::test]
    async fn test_empty_body_is_readable_stream() {
        let full = RequestBody::Empty.into_full();
        assert_eq!(full.size_hint().exact(), Some(0));
        let collected = full.collect().await.unwrap().to_bytes();
        assert!(collected.is_empty());
    }
}
