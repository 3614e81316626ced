/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The serialized message does not fit in one frame.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The frame content cannot be decoded into a message.
    #[error("malformed frame: {0}")]
    MalformedFrame(&'static str),

    /// A frame of the wrong length was handed to the codec.
    #[error("frame size mismatch ({actual} bytes, expected {expected})")]
    FrameSizeMismatch { actual: usize, expected: usize },

    /// The message header is not usable on the wire.
    #[error("invalid header {header:?}: {reason}")]
    InvalidHeader {
        header: String,
        reason: &'static str,
    },

    /// The configured frame size is outside the supported range.
    #[error("invalid frame size {size} (must be between {min} and {max})")]
    InvalidFrameSize { size: usize, min: usize, max: usize },

    /// Every writer detached before a new frame started.
    ///
    /// On a FIFO this is transient: the next writer to open the pipe
    /// resumes the stream.
    #[error("all writers detached")]
    WritersDetached,

    /// The stream ended part-way through a frame.
    #[error("truncated frame ({got} of {expected} bytes)")]
    Truncated { got: usize, expected: usize },

    /// The peer stopped accepting bytes while a frame was being written.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// A non-blocking write found no room for the frame; nothing was written.
    #[error("no room for a frame (would block)")]
    WouldBlock,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
