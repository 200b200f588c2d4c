//! Browser and page abstractions.
//!
//! [`HeadlessBrowser`] is the running browser process; [`BrowserPage`] is
//! one isolated rendering context (a tab) opened on it. Both are object
//! safe so the session manager can hold real Chrome instances and test
//! doubles behind the same `Arc<dyn HeadlessBrowser>`.

use async_trait::async_trait;

use crate::error::{PageError, Result};
use crate::service::{Media, RenderOptions};
use crate::traits::Healthcheck;

/// What the browser observed when a navigation settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// HTTP status of the main document, when the browser reports one.
    ///
    /// `None` for responses without a status (`file:`, `data:`) or when
    /// the browser does not expose it.
    pub status: Option<u16>,

    /// URL after redirects.
    pub final_url: String,
}

impl NavigationOutcome {
    /// Whether the main document answered with an HTTP error status.
    pub fn is_error_status(&self) -> bool {
        matches!(self.status, Some(status) if status >= 400)
    }
}

/// A running headless browser.
///
/// Opening a page is a blocking call into the browser's control channel;
/// callers run it on a blocking thread.
pub trait HeadlessBrowser: Healthcheck {
    /// Open a new isolated page.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PageCreation`](crate::SessionError::PageCreation)
    /// if the browser refuses the new tab.
    fn new_page(&self) -> Result<Box<dyn BrowserPage>>;
}

/// One isolated rendering context.
///
/// Pages are owned by exactly one request. [`close`](Self::close) must be
/// idempotent and must never fail.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Switch the emulated CSS media type.
    async fn emulate_media(&self, media: Media) -> std::result::Result<(), PageError>;

    /// Navigate to `url` and wait for the load to complete.
    ///
    /// The caller bounds this with its own timeout; implementations only
    /// report failures the browser itself detects.
    async fn navigate(&self, url: &str) -> std::result::Result<NavigationOutcome, PageError>;

    /// Capture the current document as PDF.
    async fn print_to_pdf(&self, options: &RenderOptions)
    -> std::result::Result<Vec<u8>, PageError>;

    /// Release the page. Safe to call more than once.
    ///
    /// Runs from `Drop` on runtime threads, so it must return promptly;
    /// slow cleanup goes to the blocking pool.
    fn close(&self);
}
