use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use fifoglue_frame::Msg;

use crate::inbox::Inbox;
use crate::liveness::Liveness;

/// A registered inbound endpoint, as seen by the process that registered it.
///
/// Dropping an `Endpoint` does not unregister it: the FIFO belongs to the
/// namespace until [`Registry::unregister`](crate::Registry::unregister)
/// removes it.
#[derive(Debug)]
pub struct Endpoint {
    name: String,
    path: PathBuf,
    inbox: Inbox,
    liveness: Liveness,
    listener: JoinHandle<()>,
}

impl Endpoint {
    pub(crate) fn new(
        name: &str,
        path: PathBuf,
        inbox: Inbox,
        liveness: Liveness,
        listener: JoinHandle<()>,
    ) -> Self {
        Self {
            name: name.to_string(),
            path,
            inbox,
            liveness,
            listener,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the FIFO backing this endpoint.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    /// Block for the next message. `None` once the listener has shut down
    /// and the inbox is drained.
    pub fn recv(&self) -> Option<Msg> {
        self.inbox.recv()
    }

    /// Split into the inbox and liveness, detaching the listener thread.
    pub fn into_parts(self) -> (Inbox, Liveness) {
        (self.inbox, self.liveness)
    }

    /// Wait for the listener thread to exit.
    ///
    /// Only returns once the listener has shut down, normally after
    /// `unregister`. Messages still buffered in the inbox are discarded.
    pub fn join(self) -> std::thread::Result<()> {
        let Self {
            listener, inbox, ..
        } = self;
        // A listener blocked on a full inbox needs the receiver gone to exit.
        drop(inbox);
        listener.join()
    }
}
