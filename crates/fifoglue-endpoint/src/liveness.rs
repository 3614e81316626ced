use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Why a listener stopped delivering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    /// The shutdown sentinel arrived (normal `unregister`).
    Requested,
    /// The FIFO could not be opened for reading.
    OpenFailed(String),
    /// Reading from the FIFO failed.
    ReadFailed(String),
    /// The inbox was dropped, so nobody could receive further messages.
    ConsumerGone,
}

impl ShutdownCause {
    /// Returns true for a clean, requested shutdown.
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested)
    }
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "shutdown requested"),
            Self::OpenFailed(reason) => write!(f, "open failed: {reason}"),
            Self::ReadFailed(reason) => write!(f, "read failed: {reason}"),
            Self::ConsumerGone => write!(f, "inbox dropped"),
        }
    }
}

/// Shared view of whether an endpoint's listener is still delivering.
///
/// Starts alive and closes exactly once; the first recorded cause wins.
/// Consumers can poll [`is_alive`](Self::is_alive) or block on
/// [`wait`](Self::wait) / [`wait_timeout`](Self::wait_timeout). By the time
/// it reads closed, the inbox has already been closed.
#[derive(Clone)]
pub struct Liveness {
    inner: Arc<Inner>,
}

struct Inner {
    cause: Mutex<Option<ShutdownCause>>,
    closed: Condvar,
}

impl Liveness {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cause: Mutex::new(None),
                closed: Condvar::new(),
            }),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lock().is_none()
    }

    /// The shutdown cause, once closed.
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.lock().clone()
    }

    /// Block until the listener shuts down.
    pub fn wait(&self) -> ShutdownCause {
        let mut guard = self.lock();
        loop {
            if let Some(cause) = guard.as_ref() {
                return cause.clone();
            }
            guard = self
                .inner
                .closed
                .wait(guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Block until the listener shuts down or `timeout` elapses.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<ShutdownCause> {
        let guard = self.lock();
        let (guard, _) = self
            .inner
            .closed
            .wait_timeout_while(guard, timeout, |cause| cause.is_none())
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }

    /// Record the shutdown. Returns false if it was already closed.
    pub(crate) fn close(&self, cause: ShutdownCause) -> bool {
        let mut guard = self.lock();
        if guard.is_some() {
            return false;
        }
        *guard = Some(cause);
        self.inner.closed.notify_all();
        true
    }

    fn lock(&self) -> MutexGuard<'_, Option<ShutdownCause>> {
        self.inner
            .cause
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liveness")
            .field("cause", &self.cause())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_alive() {
        let liveness = Liveness::new();
        assert!(liveness.is_alive());
        assert_eq!(liveness.cause(), None);
        assert_eq!(liveness.wait_timeout(Duration::from_millis(10)), None);
    }

    #[test]
    fn closes_once_first_cause_wins() {
        let liveness = Liveness::new();
        assert!(liveness.close(ShutdownCause::ReadFailed("boom".into())));
        assert!(!liveness.close(ShutdownCause::Requested));

        assert!(!liveness.is_alive());
        assert_eq!(
            liveness.cause(),
            Some(ShutdownCause::ReadFailed("boom".into()))
        );
    }

    #[test]
    fn wait_wakes_all_clones() {
        let liveness = Liveness::new();
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let liveness = liveness.clone();
                std::thread::spawn(move || liveness.wait())
            })
            .collect();

        std::thread::sleep(Duration::from_millis(20));
        liveness.close(ShutdownCause::Requested);

        for waiter in waiters {
            assert_eq!(waiter.join().unwrap(), ShutdownCause::Requested);
        }
    }

    #[test]
    fn wait_timeout_returns_cause_after_close() {
        let liveness = Liveness::new();
        let closer = liveness.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            closer.close(ShutdownCause::ConsumerGone);
        });

        assert_eq!(
            liveness.wait_timeout(Duration::from_secs(5)),
            Some(ShutdownCause::ConsumerGone)
        );
        handle.join().unwrap();
    }
}
