use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use crate::socket::pool::Poolable;
use bytes::Bytes;
use http::{Request, Response, Version};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper_util::rt::{TokioExecutor, TokioIo};

/// Wraps the underlying protocol stream (H1/H2).
#[derive(Debug)]
pub enum HttpStream {
    H1(http1::SendRequest<Full<Bytes>>),
    H2(http2::SendRequest<Full<Bytes>>),
}

impl HttpStream {
    /// Perform the protocol handshake over a connected socket. ALPN decides
    /// between HTTP/2 and HTTP/1.1; plain TCP is always HTTP/1.1.
    pub async fn handshake(socket: SocketType) -> Result<Self, NetError> {
        let is_h2 = socket.is_h2();
        let io = TokioIo::new(socket);

        if is_h2 {
            let (sender, conn) = http2::Builder::new(TokioExecutor::new())
                .handshake(io)
                .await
                .map_err(|e| {
                    tracing::debug!(error = %e, "HTTP/2 handshake failed");
                    NetError::Http2ProtocolError
                })?;
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(error = %e, "HTTP/2 connection closed with error");
                }
            });
            Ok(HttpStream::H2(sender))
        } else {
            let (sender, conn) = http1::Builder::new()
                .handshake(io)
                .await
                .map_err(|e| {
                    tracing::debug!(error = %e, "HTTP/1.1 handshake failed");
                    NetError::ConnectionFailed
                })?;
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(error = %e, "HTTP/1.1 connection closed with error");
                }
            });
            Ok(HttpStream::H1(sender))
        }
    }

    pub fn version(&self) -> Version {
        match self {
            HttpStream::H1(_) => Version::HTTP_11,
            HttpStream::H2(_) => Version::HTTP_2,
        }
    }

    /// Wait until the connection can take another request.
    pub async fn ready(&mut self) -> Result<(), NetError> {
        let res = match self {
            HttpStream::H1(s) => s.ready().await,
            HttpStream::H2(s) => s.ready().await,
        };
        res.map_err(|e| NetError::from_hyper(&e))
    }

    pub async fn send_request(
        &mut self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>, NetError> {
        let res = match self {
            HttpStream::H1(s) => s.send_request(req).await,
            HttpStream::H2(s) => s.send_request(req).await,
        };
        res.map_err(|e| {
            tracing::debug!(error = %e, "request failed");
            NetError::from_hyper(&e)
        })
    }
}

impl Poolable for HttpStream {
    fn is_open(&self) -> bool {
        match self {
            HttpStream::H1(s) => !s.is_closed(),
            HttpStream::H2(s) => !s.is_closed(),
        }
    }
}
