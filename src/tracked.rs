//! Tracked browser with metadata for session management.
//!
//! [`TrackedBrowser`] wraps the running [`HeadlessBrowser`] with an id for
//! log correlation and its launch time for [`SessionStats`](crate::SessionStats).
//!
//! ```text
//! TrackedBrowser
//! ├── id: u64 (unique identifier)
//! ├── browser: Arc<dyn HeadlessBrowser> (shared with open pages)
//! └── created_at: Instant
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::traits::{Healthcheck, HeadlessBrowser};

/// The session's browser plus bookkeeping.
///
/// Cloning shares the underlying process. Open pages hold a clone so the
/// process outlives a relaunch until they finish.
#[derive(Clone)]
pub(crate) struct TrackedBrowser {
    /// Sequential id, unique for the lifetime of the process.
    id: u64,

    browser: Arc<dyn HeadlessBrowser>,

    created_at: Instant,
}

impl TrackedBrowser {
    pub(crate) fn new(browser: Arc<dyn HeadlessBrowser>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        let id = NEXT_ID.fetch_add(1, Ordering::SeqCst);
        log::debug!("Tracking browser {}", id);

        Self {
            id,
            browser,
            created_at: Instant::now(),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn browser(&self) -> &Arc<dyn HeadlessBrowser> {
        &self.browser
    }

    /// Time since launch.
    pub(crate) fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl Healthcheck for TrackedBrowser {
    fn ping(&self) -> Result<()> {
        log::trace!("Pinging browser {}...", self.id);

        self.browser.ping().inspect_err(|e| {
            log::warn!("⚠️ Browser {} failed health check: {}", self.id, e);
        })
    }
}

impl std::fmt::Debug for TrackedBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedBrowser")
            .field("id", &self.id)
            .field("age", &self.age())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::BrowserFactory;
    use crate::factory::mock::MockBrowserFactory;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let factory = MockBrowserFactory::new();
        let first = TrackedBrowser::new(factory.create().unwrap());
        let second = TrackedBrowser::new(factory.create().unwrap());

        assert!(second.id() > first.id());
    }

    #[test]
    fn test_ping_delegates_to_browser() {
        let factory = MockBrowserFactory::new();
        let tracked = TrackedBrowser::new(factory.create().unwrap());
        assert!(tracked.ping().is_ok());

        factory.crash();
        assert!(tracked.ping().is_err());
    }

    #[test]
    fn test_clone_shares_browser() {
        let factory = MockBrowserFactory::new();
        let tracked = TrackedBrowser::new(factory.create().unwrap());
        let clone = tracked.clone();

        assert_eq!(clone.id(), tracked.id());
        assert!(Arc::ptr_eq(clone.browser(), tracked.browser()));
        assert!(format!("{:?}", tracked).contains("TrackedBrowser"));
    }
}
