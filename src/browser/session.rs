use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Counts live browser sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    open: Arc<AtomicUsize>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a session as open. It is closed when the guard drops, which
    /// covers early returns, errors and cancelled futures alike.
    pub fn open(&self, url: &str) -> SessionGuard {
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(url, open, "browser session opened");
        SessionGuard {
            open: Arc::clone(&self.open),
            url: url.to_string(),
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[must_use = "the session closes as soon as the guard is dropped"]
pub struct SessionGuard {
    open: Arc<AtomicUsize>,
    url: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let open = self.open.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(url = %self.url, open, "browser session closed");
    }
}
