//! Named endpoints over FIFOs: register, unregister, send.
//!
//! This is the layer applications use. Registering a name creates a FIFO in
//! the shared namespace directory and starts a listener thread that turns
//! the incoming frames into an [`Inbox`] of messages. Any process on the
//! machine can then [`Registry::send`] to that name.
//!
//! Listener failures are never returned from a call; they show up on the
//! endpoint's [`Liveness`] together with a [`ShutdownCause`], and the inbox
//! closes.
#![cfg(unix)]

pub mod config;
pub mod endpoint;
pub mod error;
pub mod inbox;
mod listener;
pub mod liveness;
pub mod namespace;
pub mod registry;

pub use config::{
    NamespaceConfig, DEFAULT_NAMESPACE_DIR, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_GRACE,
};
pub use endpoint::Endpoint;
pub use error::{EndpointError, Result};
pub use inbox::Inbox;
pub use liveness::{Liveness, ShutdownCause};
pub use namespace::{validate_name, Namespace};
pub use registry::Registry;
