use std::path::PathBuf;

/// Errors that can occur in FIFO transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create the FIFO object.
    #[error("failed to create fifo at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Something already exists at the requested FIFO path.
    #[error("fifo already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Failed to open the FIFO for reading or writing.
    #[error("failed to open fifo {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No FIFO exists at the requested path.
    #[error("no fifo at {path}")]
    NotFound { path: PathBuf },

    /// The path exists but is not a FIFO.
    #[error("not a fifo: {path}")]
    NotAFifo { path: PathBuf },

    /// Non-blocking open found nobody reading the FIFO.
    #[error("no reader attached to {path}")]
    NoReader { path: PathBuf },

    /// Failed to remove the FIFO object.
    #[error("failed to remove fifo {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on an open FIFO handle.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
