use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::msg::{Msg, SEPARATOR, SHUTDOWN_HEADER};

/// Default frame size in bytes.
pub const DEFAULT_FRAME_SIZE: usize = 512;

/// Largest frame a pipe is guaranteed to write atomically.
///
/// POSIX only promises `_POSIX_PIPE_BUF` (512 bytes). Frames at or under this
/// size never interleave with frames from concurrent writers.
pub const ATOMIC_WRITE_LIMIT: usize = 512;

/// Smallest frame that can still carry the shutdown sentinel.
pub const MIN_FRAME_SIZE: usize = SHUTDOWN_HEADER.len() + SEPARATOR.len_utf8();

const _: () = assert!(DEFAULT_FRAME_SIZE <= ATOMIC_WRITE_LIMIT);
const _: () = assert!(DEFAULT_FRAME_SIZE >= MIN_FRAME_SIZE);

const SEPARATOR_BYTE: u8 = SEPARATOR as u8;

/// Encode a message into exactly one frame.
///
/// Wire format:
/// ```text
/// ┌──────────┬───┬───────────┬──────────────────────┐
/// │ header   │ | │ payload   │ 0x00 padding          │
/// └──────────┴───┴───────────┴──────────────────────┘
/// <──────────────── frame_size bytes ───────────────>
/// ```
pub fn encode_frame(msg: &Msg, frame_size: usize, dst: &mut BytesMut) -> Result<()> {
    let size = msg.wire_len();
    if size > frame_size {
        return Err(FrameError::MessageTooLarge {
            size,
            max: frame_size,
        });
    }
    dst.reserve(frame_size);
    dst.put_slice(msg.header().as_bytes());
    dst.put_u8(SEPARATOR_BYTE);
    dst.put_slice(msg.payload().as_bytes());
    dst.put_bytes(0, frame_size - size);
    Ok(())
}

/// Decode one frame into a message.
///
/// Trailing zero bytes are padding and are stripped, so a payload that itself
/// ends in NUL bytes does not survive the trip. The header ends at the first
/// separator; any later separators belong to the payload.
pub fn decode_frame(src: &[u8], frame_size: usize) -> Result<Msg> {
    if src.len() != frame_size {
        return Err(FrameError::FrameSizeMismatch {
            actual: src.len(),
            expected: frame_size,
        });
    }

    let end = src.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let content = &src[..end];

    let split = content
        .iter()
        .position(|&b| b == SEPARATOR_BYTE)
        .ok_or(FrameError::MalformedFrame("missing separator"))?;

    let header = std::str::from_utf8(&content[..split])
        .map_err(|_| FrameError::MalformedFrame("header is not valid UTF-8"))?;
    let payload = std::str::from_utf8(&content[split + 1..])
        .map_err(|_| FrameError::MalformedFrame("payload is not valid UTF-8"))?;

    Ok(Msg::from_wire(header.to_owned(), payload.to_owned()))
}

/// Configuration for the frame codec.
///
/// Senders and receivers sharing a namespace must agree on the frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    frame_size: usize,
}

impl FrameConfig {
    /// Use a non-default frame size.
    ///
    /// Must be at least [`MIN_FRAME_SIZE`] and at most [`ATOMIC_WRITE_LIMIT`].
    pub fn with_frame_size(frame_size: usize) -> Result<Self> {
        if !(MIN_FRAME_SIZE..=ATOMIC_WRITE_LIMIT).contains(&frame_size) {
            return Err(FrameError::InvalidFrameSize {
                size: frame_size,
                min: MIN_FRAME_SIZE,
                max: ATOMIC_WRITE_LIMIT,
            });
        }
        Ok(Self { frame_size })
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Largest `header.len() + payload.len()` that fits in one frame.
    pub fn max_content_len(&self) -> usize {
        self.frame_size - SEPARATOR.len_utf8()
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }
}
