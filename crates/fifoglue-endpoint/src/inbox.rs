use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use fifoglue_frame::Msg;

/// Receiving side of an endpoint's bounded delivery queue.
///
/// Once the listener shuts down the queue is closed: buffered messages can
/// still be drained, after which [`recv`](Self::recv) returns `None`.
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<Msg>,
}

impl Inbox {
    pub(crate) fn new(rx: Receiver<Msg>) -> Self {
        Self { rx }
    }

    /// Block for the next message. `None` once closed and drained.
    pub fn recv(&self) -> Option<Msg> {
        self.rx.recv().ok()
    }

    /// Block for the next message, up to `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Msg, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_recv(&self) -> Result<Msg, TryRecvError> {
        self.rx.try_recv()
    }

    /// Iterate until the queue is closed and drained.
    pub fn iter(&self) -> impl Iterator<Item = Msg> + '_ {
        self.rx.iter()
    }
}

impl IntoIterator for Inbox {
    type Item = Msg;
    type IntoIter = std::sync::mpsc::IntoIter<Msg>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}
