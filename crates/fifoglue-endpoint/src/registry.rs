use std::path::PathBuf;
use std::sync::mpsc::sync_channel;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use fifoglue_frame::{encode_frame, FrameError, FrameWriter, Msg};
use fifoglue_transport::{open_write, try_open_write, TransportError};
use tracing::{debug, info, warn};

use crate::config::NamespaceConfig;
use crate::endpoint::Endpoint;
use crate::error::{EndpointError, Result};
use crate::inbox::Inbox;
use crate::listener::Listener;
use crate::liveness::Liveness;
use crate::namespace::Namespace;

const SHUTDOWN_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Registers, unregisters, and sends to endpoints in one namespace.
///
/// A `Registry` holds no endpoint state of its own; any number of registries
/// (in any number of processes) configured with the same directory see the
/// same endpoints.
#[derive(Debug, Clone)]
pub struct Registry {
    namespace: Namespace,
    config: NamespaceConfig,
}

impl Registry {
    pub fn new(config: NamespaceConfig) -> Self {
        Self {
            namespace: Namespace::new(&config.dir, config.fifo_mode),
            config,
        }
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Register a new inbound endpoint under `name`.
    ///
    /// Returns as soon as the FIFO exists and the listener thread is started.
    /// The listener attaches asynchronously; a `send` issued right away simply
    /// blocks until it has.
    pub fn register(&self, name: &str) -> Result<Endpoint> {
        let path = self.namespace.create(name)?;

        let (tx, rx) = sync_channel(self.config.queue_capacity);
        let liveness = Liveness::new();
        let listener = Listener::new(name, path.clone(), self.config.frame, tx, liveness.clone());

        let handle = match listener.spawn() {
            Ok(handle) => handle,
            Err(source) => {
                let _ = self.namespace.remove(name);
                return Err(EndpointError::Spawn {
                    name: name.to_string(),
                    source,
                });
            }
        };

        info!(name, path = ?path, "registered endpoint");
        Ok(Endpoint::new(name, path, Inbox::new(rx), liveness, handle))
    }

    /// Unregister `name`.
    ///
    /// Sends the shutdown sentinel to the endpoint's listener if one is
    /// attached, then removes the FIFO. Does not wait for the listener to
    /// exit; watch its [`Liveness`] for that. Fails with
    /// [`EndpointError::NoSuchEndpoint`] if `name` is not registered.
    pub fn unregister(&self, name: &str) -> Result<()> {
        self.namespace.path_for(name)?;
        self.request_shutdown(name);
        self.namespace.remove(name)?;
        info!(name, "unregistered endpoint");
        Ok(())
    }

    /// Deliver `msg` to the endpoint registered as `destination`.
    ///
    /// Blocks until the destination's listener is attached and the frame is
    /// written. Each call opens and closes its own connection.
    pub fn send(&self, msg: &Msg, destination: &str) -> Result<()> {
        let (path, frame) = self.prepare(msg, destination)?;
        let fifo = open_write(&path).map_err(|err| open_error(err, destination))?;
        FrameWriter::with_config(fifo, self.config.frame).write_frame(&frame)?;
        debug!(destination, header = msg.header(), "sent message");
        Ok(())
    }

    /// Like [`send`](Self::send), but never waits.
    ///
    /// Fails with [`EndpointError::NotListening`] when no listener is
    /// attached and with [`EndpointError::Full`] when the endpoint's pipe has
    /// no room for another frame. In both cases nothing was delivered.
    pub fn try_send(&self, msg: &Msg, destination: &str) -> Result<()> {
        let (path, frame) = self.prepare(msg, destination)?;
        let fifo = try_open_write(&path).map_err(|err| open_error(err, destination))?;
        match FrameWriter::with_config(fifo, self.config.frame).try_write_frame(&frame) {
            Ok(()) => {
                debug!(destination, header = msg.header(), "sent message");
                Ok(())
            }
            Err(FrameError::WouldBlock) => Err(EndpointError::Full(destination.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// Names of all endpoints currently registered in the namespace.
    pub fn endpoints(&self) -> Result<Vec<String>> {
        self.namespace.list()
    }

    pub fn is_registered(&self, name: &str) -> Result<bool> {
        self.namespace.exists(name)
    }

    /// Validate the destination and encode the frame.
    ///
    /// Encoding comes first so an oversized message never waits on a reader.
    fn prepare(&self, msg: &Msg, destination: &str) -> Result<(PathBuf, BytesMut)> {
        let path = self.namespace.path_for(destination)?;
        let mut frame = BytesMut::new();
        encode_frame(msg, self.config.frame.frame_size(), &mut frame)?;
        Ok((path, frame))
    }

    /// Best-effort delivery of the shutdown sentinel.
    ///
    /// Never blocks on the pipe. Retries while the listener has not attached
    /// yet or its pipe is full, up to the configured grace period. Any
    /// failure is logged and otherwise ignored.
    fn request_shutdown(&self, name: &str) {
        let deadline = Instant::now() + self.config.shutdown_grace;
        let sentinel = Msg::shutdown();
        loop {
            match self.try_send(&sentinel, name) {
                Ok(()) => {
                    debug!(name, "shutdown sentinel delivered");
                    return;
                }
                Err(EndpointError::NotListening(_) | EndpointError::Full(_))
                    if Instant::now() < deadline =>
                {
                    std::thread::sleep(SHUTDOWN_RETRY_INTERVAL);
                }
                Err(EndpointError::NoSuchEndpoint(_)) => return,
                Err(err) => {
                    warn!(name, error = %err, "shutdown sentinel not delivered");
                    return;
                }
            }
        }
    }
}

fn open_error(err: TransportError, destination: &str) -> EndpointError {
    match err {
        TransportError::NotFound { .. } => EndpointError::NoSuchEndpoint(destination.to_string()),
        TransportError::NoReader { .. } => EndpointError::NotListening(destination.to_string()),
        other => EndpointError::Transport(other),
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(NamespaceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liveness::ShutdownCause;

    fn test_registry(tag: &str) -> Registry {
        let dir = PathBuf::from(format!(
            "/tmp/fifoglue-reg-{}-{}-{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        Registry::new(NamespaceConfig::new(dir))
    }

    fn cleanup(registry: &Registry) {
        let _ = std::fs::remove_dir_all(&registry.config().dir);
    }

    #[test]
    fn register_creates_namespace_and_fifo() {
        let registry = test_registry("create");
        assert!(!registry.config().dir.exists());

        let endpoint = registry.register("foo").expect("register should succeed");
        assert_eq!(endpoint.name(), "foo");
        assert_eq!(endpoint.path(), registry.config().dir.join("foo"));
        assert!(registry.is_registered("foo").unwrap());
        assert!(endpoint.liveness().is_alive());

        registry.unregister("foo").expect("unregister should succeed");
        assert!(!registry.is_registered("foo").unwrap());
        cleanup(&registry);
    }

    #[test]
    fn register_rejects_invalid_names() {
        let registry = test_registry("invalid");
        for bad in ["a|b", "", "../escape"] {
            assert!(matches!(
                registry.register(bad),
                Err(EndpointError::InvalidName { .. })
            ));
        }
        cleanup(&registry);
    }

    #[test]
    fn send_rejects_oversized_before_opening() {
        let registry = test_registry("oversized");
        let msg = Msg::new("H", "x".repeat(1024)).unwrap();

        // No endpoint exists, yet the size check wins and nothing blocks.
        assert!(matches!(
            registry.send(&msg, "anyone"),
            Err(EndpointError::Frame(FrameError::MessageTooLarge { .. }))
        ));
        cleanup(&registry);
    }

    #[test]
    fn try_send_reports_not_listening() {
        let registry = test_registry("not-listening");
        registry.namespace().create("idle").unwrap();

        let msg = Msg::new("h", "p").unwrap();
        assert!(matches!(
            registry.try_send(&msg, "idle"),
            Err(EndpointError::NotListening(name)) if name == "idle"
        ));
        cleanup(&registry);
    }

    #[test]
    fn unregister_without_listener_still_removes_fifo() {
        let base = test_registry("orphan");
        let registry = Registry::new(
            base.config()
                .clone()
                .with_shutdown_grace(Duration::from_millis(20)),
        );
        registry.namespace().create("orphan").unwrap();

        registry.unregister("orphan").expect("unregister should succeed");
        assert!(!registry.is_registered("orphan").unwrap());
        cleanup(&registry);
    }

    #[test]
    fn unregister_right_after_register_shuts_listener_down() {
        let registry = test_registry("fast-unregister");
        let endpoint = registry.register("quick").unwrap();

        registry.unregister("quick").unwrap();

        assert_eq!(
            endpoint.liveness().wait_timeout(Duration::from_secs(5)),
            Some(ShutdownCause::Requested)
        );
        assert!(endpoint.recv().is_none());
        endpoint.join().unwrap();
        cleanup(&registry);
    }

    #[test]
    fn endpoints_lists_registered_names() {
        let registry = test_registry("list");
        assert!(registry.endpoints().unwrap().is_empty());

        let _a = registry.register("beta").unwrap();
        let _b = registry.register("alpha").unwrap();
        assert_eq!(registry.endpoints().unwrap(), vec!["alpha", "beta"]);

        registry.unregister("alpha").unwrap();
        registry.unregister("beta").unwrap();
        assert!(registry.endpoints().unwrap().is_empty());
        cleanup(&registry);
    }
}
