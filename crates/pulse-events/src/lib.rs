#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Typed publish/subscribe registry for the Pulse workspace.
//!
//! Callers register listeners on typed topics, emit payloads synchronously, and
//! remove listeners by handle identity. Dispatch runs on the emitting thread in
//! registration order; a panicking listener unwinds out of `emit` and the
//! remaining listeners of that round are not invoked.
//!
//! Layout: `topics.rs` (typed keys), `listener.rs` (listener handles),
//! `registry.rs` (mapping and dispatch), `config.rs` + `error.rs` (tunables).

pub mod config;
pub mod error;
pub mod listener;
pub mod registry;
pub mod topics;

pub use config::RegistryConfig;
pub use error::{ConfigError, ConfigResult};
pub use listener::Listener;
pub use registry::Registry;
pub use topics::{EventKind, Topic, TopicName};

/// Construct an empty [`Registry`] with the default configuration.
#[must_use]
pub fn registry() -> Registry {
    Registry::new()
}
