//! Fixed-size message framing for fifoglue.
//!
//! Every message travels as exactly one frame of `frame_size` bytes:
//! `header | payload`, right-padded with zero bytes. Because a frame is never
//! larger than the platform's atomic pipe write, frames from concurrent
//! writers cannot interleave and the reader never tracks partial frames.

pub mod codec;
pub mod error;
pub mod msg;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, FrameConfig, ATOMIC_WRITE_LIMIT, DEFAULT_FRAME_SIZE,
    MIN_FRAME_SIZE,
};
pub use error::{FrameError, Result};
pub use msg::{Msg, SEPARATOR, SHUTDOWN_HEADER};
pub use reader::FrameReader;
pub use writer::FrameWriter;
