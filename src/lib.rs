//! # netpeek
//!
//! A single-request HTTP diagnostic client.
//!
//! `netpeek` issues one HTTP or HTTPS request, reports how the connection
//! was made (peer address, negotiated TLS version) and renders the response
//! headers in a fixed, protocol-aware order followed by a brief or full body.
//!
//! ## Pipeline
//!
//! 1. [`http::RequestBuilder`] turns a method, URL and body into a
//!    [`http::RequestSpec`], adding a default `User-Agent`.
//! 2. [`http::Transport`] performs the round trip over a pooled connection,
//!    calling a [`socket::observer::ConnectObserver`] the moment TCP is up.
//! 3. [`render::render`] emits [`render::Event`]s: request echo, sorted
//!    headers, body.
//!
//! [`pipeline::visit`] runs all three for one [`config::DiagConfig`].
//!
//! ```rust,ignore
//! use netpeek::config::DiagConfig;
//! use netpeek::http::Transport;
//! use netpeek::render::Event;
//!
//! let config = DiagConfig::new(http::Method::GET, "https://example.com".parse()?);
//! let mut events: Vec<Event> = Vec::new();
//! netpeek::pipeline::visit(&config, &Transport::new(), &mut events).await?;
//! for event in &events {
//!     println!("{}", event);
//! }
//! ```
//!
//! ## Errors
//!
//! A TCP connect failure is [`base::Error::Connect`]. It is the one terminal
//! error class: callers must report it and stop. Build and round-trip
//! failures are ordinary results.

pub mod base;
pub mod config;
pub mod http;
pub mod pipeline;
pub mod render;
pub mod socket;
