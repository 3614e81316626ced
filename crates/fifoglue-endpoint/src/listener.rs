//! The per-endpoint listener thread.
//!
//! ```text
//! Opening ──► Reading ──► Delivering ──┐
//!    │          │  ▲                   │
//!    │          │  └───────────────────┘
//!    │          ▼
//!    └────► ShuttingDown ──► Closed
//! ```

use std::path::PathBuf;
use std::sync::mpsc::SyncSender;
use std::thread::JoinHandle;

use fifoglue_frame::{FrameConfig, FrameError, FrameReader, Msg};
use fifoglue_transport::{open_read, try_open_write, FifoReader, FifoWriter};
use tracing::{debug, error, info, warn};

use crate::liveness::{Liveness, ShutdownCause};

enum State {
    Opening,
    Reading(FrameReader<FifoReader>),
    Delivering(FrameReader<FifoReader>, Msg),
    ShuttingDown(ShutdownCause),
    Closed,
}

/// When the listener holds its own write end of the FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keepalive {
    /// As soon as the FIFO is open for reading.
    OnOpen,
    /// Only after the first time every writer detaches.
    #[cfg_attr(not(test), allow(dead_code))]
    OnDetach,
    /// Never; every detach goes through a blocking reopen.
    #[cfg_attr(not(test), allow(dead_code))]
    Never,
}

/// Owns the blocking read loop for one endpoint.
pub(crate) struct Listener {
    name: String,
    path: PathBuf,
    frame: FrameConfig,
    tx: Option<SyncSender<Msg>>,
    liveness: Liveness,
    keepalive_policy: Keepalive,
    keepalive: Option<FifoWriter>,
}

impl Listener {
    pub(crate) fn new(
        name: &str,
        path: PathBuf,
        frame: FrameConfig,
        tx: SyncSender<Msg>,
        liveness: Liveness,
    ) -> Self {
        Self {
            name: name.to_string(),
            path,
            frame,
            tx: Some(tx),
            liveness,
            keepalive_policy: Keepalive::OnOpen,
            keepalive: None,
        }
    }

    #[cfg(test)]
    fn with_keepalive(mut self, policy: Keepalive) -> Self {
        self.keepalive_policy = policy;
        self
    }

    /// Start the listener on its own thread.
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name(format!("fifoglue-{}", self.name))
            .spawn(move || self.run())
    }

    fn run(mut self) {
        let mut state = State::Opening;
        loop {
            state = match state {
                State::Opening => self.open(),
                State::Reading(reader) => self.read(reader),
                State::Delivering(reader, msg) => self.deliver(reader, msg),
                State::ShuttingDown(cause) => self.shut_down(cause),
                State::Closed => break,
            };
        }
        debug!(name = %self.name, "listener exited");
    }

    fn open(&mut self) -> State {
        // Blocks until the first writer attaches.
        let reader = match open_read(&self.path) {
            Ok(reader) => reader,
            Err(err) => return State::ShuttingDown(ShutdownCause::OpenFailed(err.to_string())),
        };

        // Holding our own write end means the read side never sees every
        // writer detach, so reads block for the next frame instead of
        // returning end-of-data between independent senders.
        if self.keepalive_policy == Keepalive::OnOpen {
            self.attach_keepalive();
        }

        debug!(name = %self.name, path = ?self.path, "listener attached");
        State::Reading(FrameReader::with_config(reader, self.frame))
    }

    fn read(&mut self, mut reader: FrameReader<FifoReader>) -> State {
        match reader.recv() {
            Ok(msg) if msg.is_shutdown() => State::ShuttingDown(ShutdownCause::Requested),
            Ok(msg) => State::Delivering(reader, msg),
            Err(FrameError::MalformedFrame(reason)) => {
                warn!(name = %self.name, reason, "skipping malformed frame");
                State::Reading(reader)
            }
            Err(FrameError::WritersDetached) => self.reattach(reader),
            Err(err) => State::ShuttingDown(ShutdownCause::ReadFailed(err.to_string())),
        }
    }

    /// Take our own write end. Cannot fail for lack of a reader while we
    /// hold the read end.
    fn attach_keepalive(&mut self) -> bool {
        match try_open_write(&self.path) {
            Ok(writer) => {
                self.keepalive = Some(writer);
                true
            }
            Err(err) => {
                warn!(name = %self.name, error = %err, "keepalive writer unavailable");
                false
            }
        }
    }

    /// Resume after every writer detached, without giving up the current
    /// read handle.
    ///
    /// Attaching the keepalive keeps the same handle readable. Without one,
    /// the listener blocks in a fresh open while the old handle stays open so
    /// that frames written in between remain buffered in the pipe. A writer
    /// that opens, writes, and closes before that open starts leaves its
    /// frame buffered until the next writer arrives.
    fn reattach(&mut self, mut reader: FrameReader<FifoReader>) -> State {
        if self.keepalive.is_none()
            && self.keepalive_policy != Keepalive::Never
            && self.attach_keepalive()
        {
            debug!(name = %self.name, "all writers detached; keepalive attached");
            return State::Reading(reader);
        }

        debug!(name = %self.name, "all writers detached; waiting for the next one");
        match open_read(&self.path) {
            Ok(fresh) => {
                drop(reader.replace_inner(fresh));
                State::Reading(reader)
            }
            Err(err) => State::ShuttingDown(ShutdownCause::ReadFailed(format!(
                "reopen failed: {err}"
            ))),
        }
    }

    fn deliver(&mut self, reader: FrameReader<FifoReader>, msg: Msg) -> State {
        let Some(tx) = self.tx.as_ref() else {
            return State::ShuttingDown(ShutdownCause::ConsumerGone);
        };
        // Blocks while the inbox is full.
        match tx.send(msg) {
            Ok(()) => State::Reading(reader),
            Err(_) => State::ShuttingDown(ShutdownCause::ConsumerGone),
        }
    }

    fn shut_down(&mut self, cause: ShutdownCause) -> State {
        // Close the inbox before liveness flips.
        drop(self.tx.take());
        drop(self.keepalive.take());

        if cause.is_requested() {
            info!(name = %self.name, "listener shut down");
        } else {
            error!(name = %self.name, %cause, "listener stopped");
        }
        self.liveness.close(cause);
        State::Closed
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::mpsc::{sync_channel, Receiver};
    use std::time::Duration;

    use bytes::BytesMut;
    use fifoglue_frame::encode_frame;
    use fifoglue_transport::{create_fifo, open_write, DEFAULT_FIFO_MODE};

    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fifoglue-listener-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_msg(path: &std::path::Path, msg: &Msg) {
        let mut frame = BytesMut::new();
        encode_frame(msg, FrameConfig::default().frame_size(), &mut frame).unwrap();
        let mut writer = open_write(path).unwrap();
        writer.write_all(&frame).unwrap();
    }

    #[test]
    fn open_failure_closes_inbox_without_delivering() {
        let dir = temp_dir("open-fail");
        let (tx, rx) = sync_channel(4);
        let liveness = Liveness::new();

        let handle = Listener::new(
            "ghost",
            dir.join("ghost"),
            FrameConfig::default(),
            tx,
            liveness.clone(),
        )
        .spawn()
        .unwrap();

        let cause = liveness.wait_timeout(Duration::from_secs(5));
        assert!(matches!(cause, Some(ShutdownCause::OpenFailed(_))));
        assert!(rx.recv().is_err(), "inbox should close empty");
        handle.join().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn delivers_until_shutdown_sentinel() {
        let dir = temp_dir("sentinel");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        let (tx, rx) = sync_channel(4);
        let liveness = Liveness::new();
        let handle = Listener::new("ep", path.clone(), FrameConfig::default(), tx, liveness.clone())
            .spawn()
            .unwrap();

        write_msg(&path, &Msg::new("h", "first").unwrap());
        write_msg(&path, &Msg::new("h", "second").unwrap());
        write_msg(&path, &Msg::shutdown());

        assert_eq!(
            liveness.wait_timeout(Duration::from_secs(5)),
            Some(ShutdownCause::Requested)
        );
        let received: Vec<String> = rx.iter().map(|m| m.payload().to_string()).collect();
        assert_eq!(received, vec!["first", "second"]);
        handle.join().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn skips_malformed_frames() {
        let dir = temp_dir("malformed");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        let (tx, rx) = sync_channel(4);
        let liveness = Liveness::new();
        let handle = Listener::new("ep", path.clone(), FrameConfig::default(), tx, liveness.clone())
            .spawn()
            .unwrap();

        {
            let mut garbage = vec![0u8; FrameConfig::default().frame_size()];
            garbage[..9].copy_from_slice(b"no-header");
            let mut writer = open_write(&path).unwrap();
            writer.write_all(&garbage).unwrap();
        }
        write_msg(&path, &Msg::new("h", "after garbage").unwrap());

        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(msg.payload(), "after garbage");
        assert!(liveness.is_alive());

        write_msg(&path, &Msg::shutdown());
        handle.join().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn spawn_with(
        path: &std::path::Path,
        policy: Keepalive,
    ) -> (Receiver<Msg>, Liveness, JoinHandle<()>) {
        let (tx, rx) = sync_channel(4);
        let liveness = Liveness::new();
        let handle = Listener::new(
            "ep",
            path.to_path_buf(),
            FrameConfig::default(),
            tx,
            liveness.clone(),
        )
        .with_keepalive(policy)
        .spawn()
        .unwrap();
        (rx, liveness, handle)
    }

    #[test]
    fn attaches_keepalive_when_writers_detach() {
        let dir = temp_dir("late-keepalive");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();
        let (rx, liveness, handle) = spawn_with(&path, Keepalive::OnDetach);

        // Each frame comes from its own writer, which closes right after.
        for n in 0..5 {
            write_msg(&path, &Msg::new("h", n.to_string()).unwrap());
            let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(msg.payload(), n.to_string());
            assert!(liveness.is_alive(), "listener stopped after frame {n}");
        }

        write_msg(&path, &Msg::shutdown());
        assert_eq!(
            liveness.wait_timeout(Duration::from_secs(5)),
            Some(ShutdownCause::Requested)
        );
        handle.join().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reopens_after_writers_detach_without_keepalive() {
        let dir = temp_dir("reopen");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();
        let (rx, liveness, handle) = spawn_with(&path, Keepalive::Never);

        for n in 0..5 {
            write_msg(&path, &Msg::new("h", n.to_string()).unwrap());
            let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(msg.payload(), n.to_string());
            assert!(liveness.is_alive(), "listener stopped after frame {n}");
            // Let the listener reach the blocking reopen before the next writer.
            std::thread::sleep(Duration::from_millis(100));
        }

        write_msg(&path, &Msg::shutdown());
        assert_eq!(
            liveness.wait_timeout(Duration::from_secs(5)),
            Some(ShutdownCause::Requested)
        );
        handle.join().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn dropped_inbox_stops_listener() {
        let dir = temp_dir("consumer-gone");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        let (tx, rx) = sync_channel(4);
        drop(rx);
        let liveness = Liveness::new();
        let handle = Listener::new("ep", path.clone(), FrameConfig::default(), tx, liveness.clone())
            .spawn()
            .unwrap();

        write_msg(&path, &Msg::new("h", "nobody home").unwrap());

        assert_eq!(
            liveness.wait_timeout(Duration::from_secs(5)),
            Some(ShutdownCause::ConsumerGone)
        );
        handle.join().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}
