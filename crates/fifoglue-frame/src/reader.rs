use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::codec::{decode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::msg::Msg;

/// Reads fixed-size frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get whole frames.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next raw frame (blocking).
    ///
    /// Returns `Err(FrameError::WritersDetached)` when the stream reports
    /// end-of-data on a frame boundary, and `Err(FrameError::Truncated)` when
    /// it ends inside a frame.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let size = self.config.frame_size();
        let mut frame = BytesMut::zeroed(size);
        let mut filled = 0usize;

        while filled < size {
            match self.inner.read(&mut frame[filled..]) {
                Ok(0) if filled == 0 => return Err(FrameError::WritersDetached),
                Ok(0) => {
                    return Err(FrameError::Truncated {
                        got: filled,
                        expected: size,
                    })
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        Ok(frame.freeze())
    }

    /// Read and decode the next message (blocking).
    pub fn recv(&mut self) -> Result<Msg> {
        let frame = self.read_frame()?;
        decode_frame(&frame, self.config.frame_size())
    }

    /// Swap in a new underlying stream, returning the old one.
    ///
    /// Framing state does not carry over, which is safe because reads always
    /// stop on a frame boundary.
    pub fn replace_inner(&mut self, inner: T) -> T {
        std::mem::replace(&mut self.inner, inner)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
