//! Chrome/Chromium browser factory implementation.
//!
//! [`ChromeBrowserFactory`] launches a headless Chrome process and wraps it
//! in [`ChromeBrowser`]; each page opened on it is a [`ChromePage`] backed
//! by one tab.
//!
//! Every call into `headless_chrome` blocks on the DevTools channel, so the
//! async [`BrowserPage`] methods move that work onto the blocking pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use url2pdf_api::ChromeBrowserFactory;
//!
//! // Auto-detect Chrome installation
//! let factory = ChromeBrowserFactory::with_defaults();
//!
//! // Or specify custom path
//! let factory = ChromeBrowserFactory::with_path("/usr/bin/google-chrome".to_string());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};

use super::{BrowserFactory, release_blocking};
use crate::error::{PageError, Result, SessionError};
use crate::service::{Media, RenderOptions};
use crate::traits::{BrowserPage, Healthcheck, HeadlessBrowser, NavigationOutcome};

/// Default per-tab wait used by `wait_until_navigated`.
const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Script reporting the HTTP status of the main document.
///
/// Evaluates to `undefined` for documents without one.
const RESPONSE_STATUS_JS: &str =
    "(() => { const e = performance.getEntriesByType('navigation')[0]; \
     return e && e.responseStatus ? e.responseStatus : undefined; })()";

// ============================================================================
// ChromeBrowserFactory
// ============================================================================

/// Factory for launching Chrome/Chromium.
///
/// Supports both auto-detection and custom Chrome binary paths.
pub struct ChromeBrowserFactory {
    /// Produces launch options for each launch.
    launch_options_fn: Box<dyn Fn() -> Result<LaunchOptions<'static>> + Send + Sync>,

    /// Upper bound Chrome itself applies to tab waits.
    page_timeout: Duration,
}

impl ChromeBrowserFactory {
    /// Create factory with custom launch options function.
    ///
    /// ```rust,ignore
    /// use url2pdf_api::{ChromeBrowserFactory, create_chrome_options, SessionError};
    ///
    /// let factory = ChromeBrowserFactory::new(|| {
    ///     create_chrome_options(Some("/custom/path"))
    ///         .map_err(|e| SessionError::Configuration(e.to_string()))
    /// });
    /// ```
    pub fn new<F>(launch_options_fn: F) -> Self
    where
        F: Fn() -> Result<LaunchOptions<'static>> + Send + Sync + 'static,
    {
        Self {
            launch_options_fn: Box::new(launch_options_fn),
            page_timeout: DEFAULT_PAGE_TIMEOUT,
        }
    }

    /// Create factory with auto-detected Chrome path.
    ///
    /// # Platform Detection
    ///
    /// | Platform | Paths Searched |
    /// |----------|----------------|
    /// | Linux | `/usr/bin/google-chrome`, `/usr/bin/chromium`, etc. |
    /// | macOS | `/Applications/Google Chrome.app/...` |
    /// | Windows | `C:\Program Files\Google\Chrome\...` |
    pub fn with_defaults() -> Self {
        log::debug!("Creating ChromeBrowserFactory with auto-detect");
        Self::new(|| {
            create_chrome_options(None).map_err(|e| SessionError::Configuration(e.to_string()))
        })
    }

    /// Create factory with custom Chrome binary path.
    pub fn with_path(chrome_path: String) -> Self {
        log::debug!("Creating ChromeBrowserFactory with custom path: {}", chrome_path);
        Self::new(move || {
            create_chrome_options(Some(&chrome_path))
                .map_err(|e| SessionError::Configuration(e.to_string()))
        })
    }

    /// Set how long Chrome waits for a tab event before giving up.
    ///
    /// Keep this at the page load timeout so a navigation abandoned by the
    /// renderer does not keep a blocking thread busy for much longer.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }
}

impl BrowserFactory for ChromeBrowserFactory {
    fn create(&self) -> Result<Arc<dyn HeadlessBrowser>> {
        let options = (self.launch_options_fn)()?;

        log::debug!("Launching Chrome browser...");
        let browser = Browser::new(options).map_err(|e| {
            log::error!("❌ Chrome launch failed: {}", e);
            SessionError::BrowserCreation(e.to_string())
        })?;

        Ok(Arc::new(ChromeBrowser {
            browser,
            page_timeout: self.page_timeout,
        }))
    }
}

// ============================================================================
// ChromeBrowser
// ============================================================================

/// A running Chrome process.
///
/// Dropping the last reference terminates the process.
pub struct ChromeBrowser {
    browser: Browser,
    page_timeout: Duration,
}

impl Healthcheck for ChromeBrowser {
    /// Query the browser version over the DevTools channel.
    fn ping(&self) -> Result<()> {
        self.browser
            .get_version()
            .map(|_| ())
            .map_err(|e| SessionError::HealthCheckFailed(e.to_string()))
    }
}

impl HeadlessBrowser for ChromeBrowser {
    fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        let tab = self.browser.new_tab().map_err(|e| {
            log::error!("❌ Failed to create tab: {}", e);
            SessionError::PageCreation(e.to_string())
        })?;
        tab.set_default_timeout(self.page_timeout);

        Ok(Box::new(ChromePage::new(tab)))
    }
}

// ============================================================================
// ChromePage
// ============================================================================

/// One Chrome tab.
///
/// The tab is closed on [`close`](BrowserPage::close) or on drop,
/// whichever comes first.
pub struct ChromePage {
    tab: Arc<Tab>,
    closed: AtomicBool,
}

impl ChromePage {
    fn new(tab: Arc<Tab>) -> Self {
        Self {
            tab,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> std::result::Result<(), PageError> {
        if self.closed.load(Ordering::Acquire) {
            Err(PageError::Closed)
        } else {
            Ok(())
        }
    }

    /// Run a blocking tab operation on the blocking pool.
    async fn with_tab<T, F>(&self, op: F) -> std::result::Result<T, PageError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> std::result::Result<T, PageError> + Send + 'static,
    {
        self.ensure_open()?;
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || op(&tab))
            .await
            .map_err(|e| PageError::Capture(format!("browser task failed: {}", e)))?
    }
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn emulate_media(&self, media: Media) -> std::result::Result<(), PageError> {
        self.with_tab(move |tab| {
            tab.call_method(Emulation::SetEmulatedMedia {
                media: Some(media.as_str().to_string()),
                features: None,
            })
            .map(|_| ())
            .map_err(|e| PageError::Navigation(format!("media emulation failed: {}", e)))
        })
        .await
    }

    async fn navigate(&self, url: &str) -> std::result::Result<NavigationOutcome, PageError> {
        let url = url.to_string();
        self.with_tab(move |tab| {
            tab.navigate_to(&url)
                .map_err(|e| PageError::Navigation(e.to_string()))?
                .wait_until_navigated()
                .map_err(|e| PageError::Timeout(e.to_string()))?;

            let status = tab
                .evaluate(RESPONSE_STATUS_JS, false)
                .ok()
                .and_then(|result| result.value)
                .and_then(|v| v.as_u64())
                .and_then(|v| u16::try_from(v).ok());

            Ok(NavigationOutcome {
                status,
                final_url: tab.get_url(),
            })
        })
        .await
    }

    async fn print_to_pdf(
        &self,
        options: &RenderOptions,
    ) -> std::result::Result<Vec<u8>, PageError> {
        let print_options = build_print_options(options);
        self.with_tab(move |tab| {
            tab.print_to_pdf(Some(print_options))
                .map_err(|e| PageError::Capture(e.to_string()))
        })
        .await
    }

    /// Marks the page closed at once; the CDP close runs on the blocking pool.
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let tab = Arc::clone(&self.tab);
        release_blocking(move || {
            if let Err(e) = tab.close(true) {
                log::warn!("Failed to close tab (continuing anyway): {}", e);
            } else {
                log::trace!("Tab closed successfully");
            }
        });
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        self.close();
    }
}

/// Translate resolved render options into Chrome's print parameters.
///
/// Paper size and margins are passed in inches; the renderer has already
/// rejected any `scale` outside Chrome's accepted range.
pub(crate) fn build_print_options(options: &RenderOptions) -> PrintToPdfOptions {
    let (paper_width, paper_height) = options.format.dimensions_inches();
    let (margin_top, margin_bottom, margin_left, margin_right) = match &options.margin {
        Some(m) => (
            m.top.inches(),
            m.bottom.inches(),
            m.left.inches(),
            m.right.inches(),
        ),
        None => (0.0, 0.0, 0.0, 0.0),
    };

    PrintToPdfOptions {
        landscape: Some(options.is_landscape()),
        display_header_footer: Some(false),
        print_background: Some(options.background),
        scale: Some(options.scale),
        paper_width: Some(paper_width),
        paper_height: Some(paper_height),
        margin_top: Some(margin_top),
        margin_bottom: Some(margin_bottom),
        margin_left: Some(margin_left),
        margin_right: Some(margin_right),
        ..Default::default()
    }
}

/// Create Chrome launch options with optional custom path.
///
/// # Chrome Flags Applied
///
/// ## Memory and Performance
/// - `--disable-dev-shm-usage` - Use /tmp instead of /dev/shm (container-friendly)
/// - `--disable-crash-reporter`
///
/// ## GPU and Rendering
/// - `--disable-gpu-compositing`
/// - `--disable-software-rasterizer`
/// - `--disable-webgl`
///
/// ## Disabled Features
/// - `--disable-extensions`
/// - `--disable-sync`
/// - `--disable-default-apps`
///
/// ## Stability
/// - `--disable-background-timer-throttling`
/// - `--disable-backgrounding-occluded-windows`
/// - `--disable-renderer-backgrounding`
///
/// Web security stays enabled: pages come from arbitrary caller-supplied
/// URLs.
///
/// The session manager owns the browser lifetime, so the idle timeout is
/// set far beyond any realistic gap between requests.
pub fn create_chrome_options(
    chrome_path: Option<&str>,
) -> std::result::Result<LaunchOptions<'static>, Box<dyn std::error::Error + Send + Sync>> {
    match chrome_path {
        Some(path) => log::debug!("Creating Chrome options with custom path: {}", path),
        None => log::debug!("Creating Chrome options (auto-detect browser)"),
    }

    let mut builder = LaunchOptions::default_builder();

    if let Some(path) = chrome_path {
        builder.path(Some(path.to_string().into()));
    }

    builder
        .headless(true)
        .sandbox(false) // required in most containers
        .disable_default_args(true)
        .idle_browser_timeout(Duration::from_secs(60 * 60 * 24 * 365))
        .args(vec![
            // ===== Memory and Performance =====
            "--disable-dev-shm-usage".as_ref(),
            "--disable-crash-reporter".as_ref(),
            // ===== GPU and Rendering =====
            "--disable-gpu-compositing".as_ref(),
            "--disable-software-rasterizer".as_ref(),
            "--disable-webgl".as_ref(),
            // ===== Disable Unnecessary Features =====
            "--disable-extensions".as_ref(),
            "--disable-sync".as_ref(),
            "--disable-default-apps".as_ref(),
            "--enable-automation".as_ref(),
            // ===== Stability =====
            "--disable-background-timer-throttling".as_ref(),
            "--disable-backgrounding-occluded-windows".as_ref(),
            "--disable-renderer-backgrounding".as_ref(),
        ])
        .build()
        .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> {
            let path_msg = chrome_path.unwrap_or("auto-detect");
            log::error!(
                "❌ Failed to build Chrome launch options (path: {}): {}",
                path_msg,
                e
            );
            e.into()
        })
}

// ============================================================================
// Unit Tests
// ============================================================================
