use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Address unreachable")]
    AddressUnreachable,
    #[error("Tunnel connection failed")]
    TunnelConnectionFailed,
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("Proxy connection failed")]
    ProxyConnectionFailed,
    #[error("Network access denied")]
    NetworkAccessDenied,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Empty response")]
    EmptyResponse,
    #[error("HTTP/2 protocol error")]
    Http2ProtocolError,
    #[error("Invalid HTTP response")]
    InvalidHttpResponse,

    // Edge case errors
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Error reading HTTP body")]
    HttpBodyError,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::SslProtocolError => -107,
            NetError::AddressUnreachable => -109,
            NetError::TunnelConnectionFailed => -111,
            NetError::ConnectionTimedOut => -118,
            NetError::ProxyConnectionFailed => -130,
            NetError::NetworkAccessDenied => -138,

            NetError::InvalidUrl => -300,
            NetError::EmptyResponse => -324,
            NetError::Http2ProtocolError => -337,
            NetError::InvalidHttpResponse => -370,
            // Edge case errors (custom codes starting at -900)
            NetError::InvalidHeader => -905,
            NetError::HttpBodyError => -906,
            NetError::Unknown(code) => *code,
        }
    }

    /// Map an OS-level I/O error from a socket operation onto a network code.
    pub fn from_io(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
            ErrorKind::ConnectionReset => NetError::ConnectionReset,
            ErrorKind::ConnectionAborted => NetError::ConnectionAborted,
            ErrorKind::TimedOut => NetError::ConnectionTimedOut,
            ErrorKind::AddrNotAvailable => NetError::AddressUnreachable,
            ErrorKind::PermissionDenied => NetError::NetworkAccessDenied,
            ErrorKind::UnexpectedEof => NetError::ConnectionClosed,
            _ => NetError::ConnectionFailed,
        }
    }

    /// Map a hyper client error onto a network code.
    pub fn from_hyper(err: &hyper::Error) -> Self {
        if err.is_timeout() {
            NetError::ConnectionTimedOut
        } else if err.is_incomplete_message() {
            NetError::EmptyResponse
        } else if err.is_parse() {
            NetError::InvalidHttpResponse
        } else if err.is_closed() || err.is_canceled() {
            NetError::ConnectionClosed
        } else {
            NetError::ConnectionFailed
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -109 => NetError::AddressUnreachable,
            -111 => NetError::TunnelConnectionFailed,
            -118 => NetError::ConnectionTimedOut,
            -130 => NetError::ProxyConnectionFailed,
            -138 => NetError::NetworkAccessDenied,

            -300 => NetError::InvalidUrl,
            -324 => NetError::EmptyResponse,
            -337 => NetError::Http2ProtocolError,
            -370 => NetError::InvalidHttpResponse,
            -905 => NetError::InvalidHeader,
            -906 => NetError::HttpBodyError,
            _ => NetError::Unknown(code),
        }
    }
}
