//! Response rendering.
//!
//! The renderer never writes to a terminal. It emits [`Event`]s into an
//! [`OutputSink`]; each event carries a [`Tag`] the sink may use for styling
//! and a `Display` impl giving its plain text.

mod body;

pub use body::{brief_lines, BRIEF_HEAD, BRIEF_TAIL};

use crate::config::RenderOptions;
use crate::http::headerorder::{sorted_lines, HeaderLine};
use crate::http::{RequestEcho, ResponseView, TlsVersion};
use bytes::Bytes;
use http::{Method, Version};
use std::fmt;

/// Styling hint for an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Success,
    Info,
    Neutral,
}

/// One unit of output, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// TCP connection established.
    Connected { peer: String },
    /// TLS version of the connection that carried the response.
    ConnectedVia(TlsVersion),
    RequestLine { method: Method, version: Version },
    RequestHost(String),
    RequestUserAgent(String),
    RequestAccept(String),
    /// Separates the request echo from the response.
    ResponseMarker,
    Header(HeaderLine),
    BodyLabel,
    /// One line of a brief body, without its line feed.
    BodyLine(String),
    /// The complete body, byte for byte.
    BodyFull(Bytes),
}

impl Event {
    pub fn tag(&self) -> Tag {
        match self {
            Event::Connected { .. } | Event::ConnectedVia(_) => Tag::Success,
            Event::RequestLine { .. }
            | Event::RequestHost(_)
            | Event::RequestUserAgent(_)
            | Event::RequestAccept(_)
            | Event::ResponseMarker
            | Event::BodyLabel => Tag::Info,
            Event::Header(_) | Event::BodyLine(_) | Event::BodyFull(_) => Tag::Neutral,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Connected { peer } => write!(f, "Connected to {}", peer),
            Event::ConnectedVia(tls) => write!(f, "Connected via {}", tls),
            Event::RequestLine { method, version } => write!(f, ">{} {:?}", method, version),
            Event::RequestHost(host) => write!(f, ">Host: {}", host),
            Event::RequestUserAgent(ua) => write!(f, ">User-Agent: {}", ua),
            Event::RequestAccept(accept) => write!(f, ">Accept: {}", accept),
            Event::ResponseMarker => f.write_str("*Get response from server"),
            Event::Header(line) => write!(f, "{}: {}", line.name, line.joined()),
            Event::BodyLabel => f.write_str("Body:"),
            Event::BodyLine(line) => f.write_str(line),
            Event::BodyFull(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

/// Consumer of rendering events.
pub trait OutputSink {
    fn emit(&mut self, event: Event);
}

impl OutputSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Render a response: optional request echo, sorted headers, then the body.
///
/// Headers are printed exactly once whatever the options. The body is read
/// here and released before this returns; a read failure renders as an
/// empty body.
pub async fn render(resp: ResponseView, opts: RenderOptions, sink: &mut dyn OutputSink) {
    let (meta, body) = resp.into_parts();

    if opts.show_connect_info {
        echo_request(&meta.request, sink);
        sink.emit(Event::ResponseMarker);
    }

    for line in sorted_lines(&meta.headers) {
        sink.emit(Event::Header(line));
    }

    let bytes = match body.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read response body, rendering it empty");
            Bytes::new()
        }
    };

    sink.emit(Event::BodyLabel);
    if opts.show_full_body {
        sink.emit(Event::BodyFull(bytes));
    } else {
        let text = String::from_utf8_lossy(&bytes);
        for line in brief_lines(&text) {
            sink.emit(Event::BodyLine(line.to_string()));
        }
    }
}

fn echo_request(req: &RequestEcho, sink: &mut dyn OutputSink) {
    sink.emit(Event::RequestLine {
        method: req.method.clone(),
        version: req.version,
    });
    sink.emit(Event::RequestHost(req.host.clone()));
    sink.emit(Event::RequestUserAgent(
        req.user_agent.clone().unwrap_or_else(|| "*".to_string()),
    ));
    sink.emit(Event::RequestAccept(
        req.accept.clone().unwrap_or_else(|| "*/*".to_string()),
    ));
}
