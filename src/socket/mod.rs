//! Socket and connection management.
//!
//! - [`connectjob`]: DNS → TCP → (proxy CONNECT) → TLS, with the connect hook
//! - [`pool`]: idle connection reuse
//! - [`proxy`]: proxy selection from the environment
//! - [`tls`]: TLS configuration with BoringSSL

pub mod client;
pub mod connectjob;
pub mod observer;
pub mod pool;
pub mod proxy;
pub mod tls;
