use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Read end of an open FIFO.
///
/// Returned by [`open_read`](crate::open_read). A read of zero bytes means
/// every writer has detached; the FIFO itself is still usable and a fresh
/// [`open_read`](crate::open_read) blocks until the next writer shows up.
pub struct FifoReader {
    file: File,
    path: PathBuf,
}

impl FifoReader {
    pub(crate) fn new(file: File, path: PathBuf) -> Self {
        Self { file, path }
    }

    /// Path of the FIFO this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for FifoReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl std::fmt::Debug for FifoReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoReader")
            .field("path", &self.path)
            .finish()
    }
}

/// Write end of an open FIFO.
///
/// Each send in fifoglue opens a fresh writer and drops it after one frame;
/// the handle is not meant to be kept as a persistent stream.
pub struct FifoWriter {
    file: File,
    path: PathBuf,
}

impl FifoWriter {
    pub(crate) fn new(file: File, path: PathBuf) -> Self {
        Self { file, path }
    }

    /// Path of the FIFO this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Write for FifoWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl std::fmt::Debug for FifoWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoWriter")
            .field("path", &self.path)
            .finish()
    }
}
