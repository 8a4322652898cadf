//! Application state shared across handlers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::db::ClientStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the client store and the
/// counters reported by `GET /status`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ClientStore>,
    started_at: Instant,
    request_count: AtomicU64,
}

impl AppState {
    /// Create a new application state over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                started_at: Instant::now(),
                request_count: AtomicU64::new(0),
            }),
        }
    }

    /// Get a reference to the client store.
    #[must_use]
    pub fn store(&self) -> &dyn ClientStore {
        self.inner.store.as_ref()
    }

    /// Time since the state was created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.inner.started_at.elapsed()
    }

    /// Requests served so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.inner.request_count.load(Ordering::Relaxed)
    }

    /// Count one more request and return the new total.
    pub fn record_request(&self) -> u64 {
        self.inner.request_count.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("uptime", &self.uptime())
            .field("request_count", &self.request_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryClientStore;

    #[test]
    fn test_request_counter() {
        let state = AppState::new(Arc::new(MemoryClientStore::new()));
        assert_eq!(state.request_count(), 0);

        let clone = state.clone();
        assert_eq!(clone.record_request(), 1);
        assert_eq!(state.record_request(), 2);
        assert_eq!(state.request_count(), 2);
    }
}
