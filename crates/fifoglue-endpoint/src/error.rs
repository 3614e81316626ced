use std::path::PathBuf;

/// Errors that can occur in endpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    /// The endpoint name cannot be used as a namespace entry.
    #[error("invalid endpoint name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Another endpoint already owns this name.
    #[error("endpoint {0:?} is already registered")]
    AlreadyRegistered(String),

    /// No endpoint is registered under this name.
    #[error("no such endpoint {0:?}")]
    NoSuchEndpoint(String),

    /// The endpoint exists but nothing is reading from it.
    #[error("endpoint {0:?} has no listener attached")]
    NotListening(String),

    /// The endpoint's pipe is full, so a non-blocking send wrote nothing.
    #[error("endpoint {0:?} is full; message not delivered")]
    Full(String),

    /// The namespace directory could not be created or read.
    #[error("namespace {path}: {source}")]
    Namespace {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The listener thread could not be started.
    #[error("failed to spawn listener for {name:?}: {source}")]
    Spawn {
        name: String,
        source: std::io::Error,
    },

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] fifoglue_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] fifoglue_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, EndpointError>;
