//! Named, unidirectional message delivery between local processes.
//!
//! A process registers a name and receives messages on it; any other process
//! on the machine sends to that name. Endpoints are FIFOs in a shared
//! namespace directory, and every message is one fixed-size frame.
//!
//! # Crate Structure
//!
//! - [`transport`] — FIFO create/open/remove
//! - [`frame`] — Fixed-size `header|payload` framing
//! - [`endpoint`] — Registration, listener threads, and send
//!
//! ```no_run
//! use fifoglue::{Msg, Registry};
//!
//! let registry = Registry::default();
//! let endpoint = registry.register("p2")?;
//! registry.send(&Msg::new("Header", "hello")?, "p2")?;
//! let msg = endpoint.recv();
//! registry.unregister("p2")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use fifoglue_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use fifoglue_frame::*;
}

/// Re-export endpoint types.
#[cfg(unix)]
pub mod endpoint {
    pub use fifoglue_endpoint::*;
}

pub use fifoglue_frame::Msg;

#[cfg(unix)]
pub use fifoglue_endpoint::{
    Endpoint, EndpointError, Inbox, Liveness, NamespaceConfig, Registry, ShutdownCause,
};
