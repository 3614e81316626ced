use std::fmt;
use std::io;

use fifoglue_endpoint::EndpointError;
use fifoglue_frame::FrameError;
use fifoglue_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const TRANSPORT_ERROR: i32 = 3;
pub const NOT_FOUND: i32 = 4;
pub const ALREADY_EXISTS: i32 = 5;
pub const LISTENER_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::AlreadyExists => ALREADY_EXISTS,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Create { source, .. }
        | TransportError::Open { source, .. }
        | TransportError::Remove { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        TransportError::NotFound { .. } => CliError::new(NOT_FOUND, format!("{context}: {err}")),
        TransportError::AlreadyExists { .. } => {
            CliError::new(ALREADY_EXISTS, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::MessageTooLarge { .. } | FrameError::InvalidHeader { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::InvalidFrameSize { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn endpoint_error(context: &str, err: EndpointError) -> CliError {
    match err {
        EndpointError::Transport(err) => transport_error(context, err),
        EndpointError::Frame(err) => frame_error(context, err),
        EndpointError::Namespace { source, .. } => io_error(context, source),
        EndpointError::InvalidName { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        EndpointError::NoSuchEndpoint(_) => CliError::new(NOT_FOUND, format!("{context}: {err}")),
        EndpointError::AlreadyRegistered(_) => {
            CliError::new(ALREADY_EXISTS, format!("{context}: {err}"))
        }
        EndpointError::NotListening(_) | EndpointError::Full(_) => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
