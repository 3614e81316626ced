//! Named-pipe (FIFO) transport for fifoglue.
//!
//! The lowest layer: create a FIFO object at a path, open it for blocking
//! reads or writes, and remove it again. Frames are read and written through
//! the [`FifoReader`] and [`FifoWriter`] handles returned here.
//!
//! FIFOs are a Unix primitive; on other platforms this crate is empty.

pub mod error;

#[cfg(unix)]
pub mod fifo;
#[cfg(unix)]
pub mod handle;

pub use error::{Result, TransportError};

#[cfg(unix)]
pub use fifo::{
    create_fifo, is_fifo, open_read, open_write, remove_fifo, try_open_write, DEFAULT_FIFO_MODE,
};
#[cfg(unix)]
pub use handle::{FifoReader, FifoWriter};
