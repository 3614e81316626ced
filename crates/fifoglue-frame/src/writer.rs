use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::msg::Msg;

/// Writes fixed-size frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(config.frame_size()),
            config,
        }
    }

    /// Encode and write one message (blocking).
    pub fn send(&mut self, msg: &Msg) -> Result<()> {
        self.buf.clear();
        encode_frame(msg, self.config.frame_size(), &mut self.buf)?;
        let frame = self.buf.split().freeze();
        self.write_frame(&frame)
    }

    /// Write one already-encoded frame (blocking).
    ///
    /// The frame must be exactly `frame_size` bytes.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.check_len(frame)?;
        self.write_from(frame, 0)
    }

    /// Write one already-encoded frame, or fail with
    /// [`FrameError::WouldBlock`] if the stream cannot take it right now.
    ///
    /// Meant for non-blocking pipe handles, where a frame no larger than
    /// the atomic write limit is accepted whole or not at all. If a stream
    /// does accept only part of the frame, the rest is written blocking.
    pub fn try_write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.check_len(frame)?;
        let written = loop {
            match self.inner.write(frame) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    return Err(FrameError::WouldBlock)
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        };
        self.write_from(frame, written)
    }

    fn check_len(&self, frame: &[u8]) -> Result<()> {
        if frame.len() != self.config.frame_size() {
            return Err(FrameError::FrameSizeMismatch {
                actual: frame.len(),
                expected: self.config.frame_size(),
            });
        }
        Ok(())
    }

    fn write_from(&mut self, frame: &[u8], mut offset: usize) -> Result<()> {
        while offset < frame.len() {
            match self.inner.write(&frame[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
