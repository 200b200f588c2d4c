//! RAII handle for a page checked out of the session.
//!
//! [`PageHandle`] owns one [`BrowserPage`] for the duration of a request.
//! Dropping it closes the page and releases its slot in the session's
//! open page count, on every exit path: success, error, early return, or
//! cancellation of the request future.
//!
//! ```text
//! acquire_page() ──→ PageHandle ──→ navigate / print ──→ drop
//!                         │                               │
//!                         └── open_pages += 1             └── close(), open_pages -= 1
//! ```
//!
//! The handle keeps the browser that opened the page alive, so a relaunch
//! triggered by another request never pulls the process out from under it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::traits::{BrowserPage, HeadlessBrowser};

/// An open page owned by one request.
///
/// Derefs to [`BrowserPage`].
pub struct PageHandle {
    page: Box<dyn BrowserPage>,

    browser_id: u64,

    /// Held only to keep the process alive.
    _browser: Arc<dyn HeadlessBrowser>,

    open_pages: Arc<AtomicUsize>,
}

impl PageHandle {
    /// Called by [`SessionManager::acquire_page`](crate::SessionManager::acquire_page)
    /// after it has incremented `open_pages`.
    pub(crate) fn new(
        page: Box<dyn BrowserPage>,
        browser_id: u64,
        browser: Arc<dyn HeadlessBrowser>,
        open_pages: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            page,
            browser_id,
            _browser: browser,
            open_pages,
        }
    }

    /// Id of the browser this page belongs to.
    pub fn browser_id(&self) -> u64 {
        self.browser_id
    }
}

impl std::ops::Deref for PageHandle {
    type Target = dyn BrowserPage;

    fn deref(&self) -> &Self::Target {
        self.page.as_ref()
    }
}

impl Drop for PageHandle {
    fn drop(&mut self) {
        log::trace!("Releasing page on browser {}", self.browser_id);
        self.page.close();
        self.open_pages.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHandle")
            .field("browser_id", &self.browser_id)
            .finish()
    }
}
