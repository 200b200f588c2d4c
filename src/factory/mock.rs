//! In-memory browser for testing.
//!
//! [`MockBrowserFactory`] launches [`MockBrowser`]s that never touch a real
//! Chrome process. Pages "render" a small fake PDF that embeds the URL they
//! were navigated to, so tests can tell artifacts apart.
//!
//! # Feature Flag
//!
//! This module is only available when:
//! - The `test-utils` feature is enabled, OR
//! - During testing (`#[cfg(test)]`)
//!
//! # Example
//!
//! ```rust,ignore
//! use url2pdf_api::factory::mock::MockBrowserFactory;
//!
//! // Factory that always fails
//! let factory = MockBrowserFactory::always_fails("Chrome not installed");
//!
//! // Pages that answer 404
//! let factory = MockBrowserFactory::new().with_status(404);
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BrowserFactory, release_blocking};
use crate::error::{PageError, Result, SessionError};
use crate::service::{Media, RenderOptions};
use crate::traits::{BrowserPage, Healthcheck, HeadlessBrowser, NavigationOutcome};

/// How pages opened by the mock behave.
#[derive(Debug, Clone, Default)]
struct PageBehavior {
    navigation_delay: Duration,
    status: Option<u16>,
    navigation_error: Option<String>,
    capture_error: Option<String>,
    empty_pdf: bool,
    close_delay: Duration,
}

/// State shared between a factory, its clones, and every browser it launched.
#[derive(Debug, Default)]
struct Shared {
    creation_count: Arc<AtomicUsize>,
    open_pages: AtomicUsize,
    browsers: Mutex<Vec<Arc<AtomicBool>>>,
    last_print_options: Mutex<Option<RenderOptions>>,
    last_media: Mutex<Option<Media>>,
}

/// Mock browser factory for testing without Chrome.
///
/// Cloning is cheap and every clone observes the same counters, so a test
/// can keep one clone while the session manager owns another.
///
/// # Example
///
/// ```rust,ignore
/// use url2pdf_api::factory::mock::MockBrowserFactory;
///
/// let factory = MockBrowserFactory::always_fails("Test error");
/// assert!(factory.create().is_err());
/// assert_eq!(factory.creation_count(), 1);
/// ```
#[derive(Clone)]
pub struct MockBrowserFactory {
    should_fail: bool,
    error_message: String,
    /// Fail once this many launches have succeeded.
    fail_after: Option<usize>,
    /// Fail the first this-many launches.
    fail_first: Option<usize>,
    launch_delay: Duration,
    behavior: PageBehavior,
    shared: Arc<Shared>,
}

impl MockBrowserFactory {
    /// Factory whose browsers always launch and render successfully.
    pub fn new() -> Self {
        Self {
            should_fail: false,
            error_message: String::new(),
            fail_after: None,
            fail_first: None,
            launch_delay: Duration::ZERO,
            behavior: PageBehavior::default(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// Factory that always fails with the given message.
    pub fn always_fails<S: Into<String>>(message: S) -> Self {
        Self {
            should_fail: true,
            error_message: message.into(),
            ..Self::new()
        }
    }

    /// Factory that fails after `n` successful launches.
    pub fn fail_after_n<S: Into<String>>(n: usize, message: S) -> Self {
        Self {
            error_message: message.into(),
            fail_after: Some(n),
            ..Self::new()
        }
    }

    /// Factory that fails the first `n` launches, then succeeds.
    pub fn fail_first_n<S: Into<String>>(n: usize, message: S) -> Self {
        Self {
            error_message: message.into(),
            fail_first: Some(n),
            ..Self::new()
        }
    }

    /// Block each launch for `delay`.
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    /// Make every navigation take `delay` (async sleep).
    pub fn with_navigation_delay(mut self, delay: Duration) -> Self {
        self.behavior.navigation_delay = delay;
        self
    }

    /// HTTP status reported for every navigation.
    pub fn with_status(mut self, status: u16) -> Self {
        self.behavior.status = Some(status);
        self
    }

    /// Fail every navigation with `message`.
    pub fn with_navigation_error<S: Into<String>>(mut self, message: S) -> Self {
        self.behavior.navigation_error = Some(message.into());
        self
    }

    /// Fail every capture with `message`.
    pub fn with_capture_error<S: Into<String>>(mut self, message: S) -> Self {
        self.behavior.capture_error = Some(message.into());
        self
    }

    /// Capture zero bytes.
    pub fn with_empty_pdf(mut self) -> Self {
        self.behavior.empty_pdf = true;
        self
    }

    /// Make closing a page block for `delay`, like a slow CDP round trip.
    ///
    /// The page counts as closed immediately; the delay runs the way the
    /// Chrome page runs its tab close.
    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.behavior.close_delay = delay;
        self
    }

    /// Number of launch attempts so far.
    pub fn creation_count(&self) -> usize {
        self.shared.creation_count.load(Ordering::SeqCst)
    }

    /// Reset the launch counter to zero.
    pub fn reset_count(&self) {
        self.shared.creation_count.store(0, Ordering::SeqCst);
    }

    /// Shared launch counter, usable after the factory has been moved.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.shared.creation_count)
    }

    /// Pages opened and not yet closed, across all launched browsers.
    pub fn open_pages(&self) -> usize {
        self.shared.open_pages.load(Ordering::SeqCst)
    }

    /// Simulate every launched browser process dying.
    pub fn crash(&self) {
        if let Ok(browsers) = self.shared.browsers.lock() {
            for alive in browsers.iter() {
                alive.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Options passed to the most recent capture.
    pub fn last_print_options(&self) -> Option<RenderOptions> {
        self.shared
            .last_print_options
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }

    /// Media type most recently emulated.
    pub fn last_media(&self) -> Option<Media> {
        self.shared.last_media.lock().ok().and_then(|guard| *guard)
    }
}

impl Default for MockBrowserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFactory for MockBrowserFactory {
    fn create(&self) -> Result<Arc<dyn HeadlessBrowser>> {
        let count = self.shared.creation_count.fetch_add(1, Ordering::SeqCst);

        if !self.launch_delay.is_zero() {
            std::thread::sleep(self.launch_delay);
        }

        if self.should_fail {
            log::debug!("MockBrowserFactory: Returning configured failure");
            return Err(SessionError::BrowserCreation(self.error_message.clone()));
        }

        if let Some(fail_after) = self.fail_after {
            if count >= fail_after {
                log::debug!("MockBrowserFactory: Failing after {} creations", fail_after);
                return Err(SessionError::BrowserCreation(self.error_message.clone()));
            }
        }

        if let Some(fail_first) = self.fail_first {
            if count < fail_first {
                log::debug!("MockBrowserFactory: Failing launch #{}", count + 1);
                return Err(SessionError::BrowserCreation(self.error_message.clone()));
            }
        }

        let alive = Arc::new(AtomicBool::new(true));
        if let Ok(mut browsers) = self.shared.browsers.lock() {
            browsers.push(Arc::clone(&alive));
        }

        log::debug!("MockBrowserFactory: Launched mock browser #{}", count + 1);
        Ok(Arc::new(MockBrowser {
            alive,
            behavior: self.behavior.clone(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

impl std::fmt::Debug for MockBrowserFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBrowserFactory")
            .field("should_fail", &self.should_fail)
            .field("error_message", &self.error_message)
            .field("creation_count", &self.creation_count())
            .field("fail_after", &self.fail_after)
            .field("fail_first", &self.fail_first)
            .finish()
    }
}

// ============================================================================
// MockBrowser / MockPage
// ============================================================================

/// A fake browser process.
pub struct MockBrowser {
    alive: Arc<AtomicBool>,
    behavior: PageBehavior,
    shared: Arc<Shared>,
}

impl Healthcheck for MockBrowser {
    fn ping(&self) -> Result<()> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SessionError::HealthCheckFailed("mock browser crashed".to_string()))
        }
    }
}

impl HeadlessBrowser for MockBrowser {
    fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(SessionError::PageCreation("mock browser crashed".to_string()));
        }

        self.shared.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            url: Mutex::new(None),
            closed: AtomicBool::new(false),
            behavior: self.behavior.clone(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// A fake tab.
pub struct MockPage {
    url: Mutex<Option<String>>,
    closed: AtomicBool,
    behavior: PageBehavior,
    shared: Arc<Shared>,
}

impl MockPage {
    fn ensure_open(&self) -> std::result::Result<(), PageError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(PageError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn emulate_media(&self, media: Media) -> std::result::Result<(), PageError> {
        self.ensure_open()?;
        if let Ok(mut last) = self.shared.last_media.lock() {
            *last = Some(media);
        }
        Ok(())
    }

    async fn navigate(&self, url: &str) -> std::result::Result<NavigationOutcome, PageError> {
        self.ensure_open()?;

        if !self.behavior.navigation_delay.is_zero() {
            tokio::time::sleep(self.behavior.navigation_delay).await;
        }

        if let Some(message) = &self.behavior.navigation_error {
            return Err(PageError::Navigation(message.clone()));
        }

        if let Ok(mut current) = self.url.lock() {
            *current = Some(url.to_string());
        }

        Ok(NavigationOutcome {
            status: Some(self.behavior.status.unwrap_or(200)),
            final_url: url.to_string(),
        })
    }

    async fn print_to_pdf(
        &self,
        options: &RenderOptions,
    ) -> std::result::Result<Vec<u8>, PageError> {
        self.ensure_open()?;

        if let Ok(mut last) = self.shared.last_print_options.lock() {
            *last = Some(options.clone());
        }

        if let Some(message) = &self.behavior.capture_error {
            return Err(PageError::Capture(message.clone()));
        }

        if self.behavior.empty_pdf {
            return Ok(Vec::new());
        }

        let url = self
            .url
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| "about:blank".to_string());

        Ok(format!("%PDF-1.7\n% {}\n%%EOF\n", url).into_bytes())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.open_pages.fetch_sub(1, Ordering::SeqCst);

        let delay = self.behavior.close_delay;
        if !delay.is_zero() {
            release_blocking(move || std::thread::sleep(delay));
        }
    }
}

impl Drop for MockPage {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
