use std::path::{Path, PathBuf};
use std::time::Duration;

use fifoglue_frame::FrameConfig;
use fifoglue_transport::DEFAULT_FIFO_MODE;

/// Default machine-wide namespace directory.
pub const DEFAULT_NAMESPACE_DIR: &str = "/tmp/fifoglue";

/// Default inbox capacity, in messages.
pub const DEFAULT_QUEUE_CAPACITY: usize = 20_480;

/// Default time `unregister` keeps retrying the shutdown sentinel while the
/// listener has not attached yet.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Controls where endpoints live and how they behave.
///
/// Every process talking through one namespace must use the same directory
/// and frame size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Directory whose FIFO entries are the registered endpoints.
    pub dir: PathBuf,
    /// Frame codec settings shared by senders and listeners.
    pub frame: FrameConfig,
    /// Bounded inbox capacity per endpoint. Zero makes every delivery a
    /// rendezvous with the consumer.
    pub queue_capacity: usize,
    /// Permission bits for created FIFOs.
    pub fifo_mode: u32,
    /// How long `unregister` retries the shutdown sentinel.
    pub shutdown_grace: Duration,
}

impl NamespaceConfig {
    /// Default settings rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_frame(mut self, frame: FrameConfig) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_fifo_mode(mut self, fifo_mode: u32) -> Self {
        self.fifo_mode = fifo_mode;
        self
    }

    pub fn with_shutdown_grace(mut self, shutdown_grace: Duration) -> Self {
        self.shutdown_grace = shutdown_grace;
        self
    }
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_NAMESPACE_DIR),
            frame: FrameConfig::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            fifo_mode: DEFAULT_FIFO_MODE,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}
