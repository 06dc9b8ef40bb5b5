//! Connection-lifecycle hook.
//!
//! The connect job calls the observer exactly once per fresh connection, at
//! the moment the TCP connection is established (or has definitively failed),
//! before any request bytes are written.

use crate::base::neterror::NetError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEvent {
    /// `ip:port` of the remote end (the proxy, when one is used).
    pub peer_address: String,
    /// Network kind, e.g. `"tcp"`.
    pub network_kind: String,
    /// Set when the connection could not be established.
    pub error: Option<NetError>,
}

impl ConnectionEvent {
    pub fn connected(peer_address: impl Into<String>) -> Self {
        Self {
            peer_address: peer_address.into(),
            network_kind: "tcp".to_string(),
            error: None,
        }
    }

    pub fn failed(peer_address: impl Into<String>, error: NetError) -> Self {
        Self {
            peer_address: peer_address.into(),
            network_kind: "tcp".to_string(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub trait ConnectObserver {
    fn on_connect(&mut self, event: &ConnectionEvent);
}

impl<F: FnMut(&ConnectionEvent)> ConnectObserver for F {
    fn on_connect(&mut self, event: &ConnectionEvent) {
        self(event)
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ConnectObserver for NoopObserver {
    fn on_connect(&mut self, _event: &ConnectionEvent) {}
}
