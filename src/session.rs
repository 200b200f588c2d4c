//! Shared browser session management.
//!
//! [`SessionManager`] owns at most one running browser and hands out
//! isolated pages on it. The browser is launched lazily on first use,
//! reused by every request after that, and relaunched when it stops
//! answering its health check.
//!
//! # Architecture
//!
//! ```text
//! SessionManager
//!   └─ Arc<SessionInner>
//!        ├─ factory: Arc<dyn BrowserFactory>
//!        ├─ state: Mutex<SessionState>        (phase + current browser)
//!        ├─ launch_gate: tokio Mutex<()>      (one launch at a time)
//!        └─ open_pages: Arc<AtomicUsize>      (shared with every PageHandle)
//! ```
//!
//! # Launch Coordination
//!
//! Concurrent requests that find no usable browser queue on the launch
//! gate. The first one launches; the rest re-check the state once they get
//! the gate and reuse the browser it produced. A failed launch is not
//! shared: every waiter whose turn comes while the session is `Failed`
//! makes its own attempt.
//!
//! A launch runs on the blocking pool under the launch timeout. If the
//! caller is cancelled mid-launch the session records the launch as
//! abandoned and moves to `Failed`, so it never stays `Launching`.
//!
//! # Example
//!
//! ```rust,ignore
//! use url2pdf_api::{ChromeBrowserFactory, SessionManager};
//!
//! let sessions = SessionManager::builder()
//!     .factory(Box::new(ChromeBrowserFactory::with_defaults()))
//!     .build()?
//!     .into_shared();
//!
//! let page = sessions.acquire_page().await?;
//! page.navigate("https://example.com").await?;
//! // page closed when dropped
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{Result, SessionError};
use crate::factory::BrowserFactory;
use crate::handle::PageHandle;
use crate::stats::{SessionPhase, SessionStats};
use crate::traits::{BrowserPage, Healthcheck};
use crate::tracked::TrackedBrowser;

/// Default upper bound on a single browser launch.
pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SessionState
// ============================================================================

enum SessionState {
    Uninitialized,
    Launching,
    Ready(TrackedBrowser),
    Failed(String),
    ShuttingDown,
}

impl SessionState {
    fn phase(&self) -> SessionPhase {
        match self {
            Self::Uninitialized => SessionPhase::Uninitialized,
            Self::Launching => SessionPhase::Launching,
            Self::Ready(_) => SessionPhase::Ready,
            Self::Failed(_) => SessionPhase::Failed,
            Self::ShuttingDown => SessionPhase::ShuttingDown,
        }
    }
}

// ============================================================================
// SessionInner
// ============================================================================

struct SessionInner {
    factory: Arc<dyn BrowserFactory>,
    launch_timeout: Duration,
    state: Mutex<SessionState>,
    launch_gate: tokio::sync::Mutex<()>,
    open_pages: Arc<AtomicUsize>,
    launches: AtomicU64,
    launch_failures: AtomicU64,
    shutting_down: AtomicBool,
}

impl SessionInner {
    /// Lock the state. A panic while holding the lock cannot leave the
    /// state half-written, so poisoning is ignored.
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ready_browser(&self) -> Result<Option<TrackedBrowser>> {
        match &*self.state() {
            SessionState::ShuttingDown => Err(SessionError::ShuttingDown),
            SessionState::Ready(tracked) => Ok(Some(tracked.clone())),
            _ => Ok(None),
        }
    }

    /// Move a `Ready` browser with this id to `Failed`.
    ///
    /// No-op if another request already replaced it.
    fn invalidate(&self, browser_id: u64, reason: &str) {
        let mut state = self.state();
        if let SessionState::Ready(tracked) = &*state {
            if tracked.id() == browser_id {
                log::warn!("⚠️ Discarding browser {}: {}", browser_id, reason);
                *state = SessionState::Failed(reason.to_string());
            }
        }
    }
}

/// Marks an in-flight launch. Dropping it unresolved records the launch
/// as abandoned.
struct LaunchAttempt<'a> {
    inner: &'a SessionInner,
    resolved: bool,
}

impl<'a> LaunchAttempt<'a> {
    fn begin(inner: &'a SessionInner) -> Result<Self> {
        let mut state = inner.state();
        if matches!(*state, SessionState::ShuttingDown) {
            return Err(SessionError::ShuttingDown);
        }
        *state = SessionState::Launching;
        Ok(Self {
            inner,
            resolved: false,
        })
    }

    fn succeed(mut self, tracked: TrackedBrowser) -> Result<TrackedBrowser> {
        self.resolved = true;
        self.inner.launches.fetch_add(1, Ordering::SeqCst);

        let mut state = self.inner.state();
        if matches!(*state, SessionState::ShuttingDown) {
            // Dropping `tracked` here terminates the process.
            return Err(SessionError::ShuttingDown);
        }
        *state = SessionState::Ready(tracked.clone());
        Ok(tracked)
    }

    fn fail(mut self, error: SessionError) -> SessionError {
        self.resolved = true;
        self.record_failure(error.to_string());
        error
    }

    fn record_failure(&self, reason: String) {
        self.inner.launch_failures.fetch_add(1, Ordering::SeqCst);
        let mut state = self.inner.state();
        if !matches!(*state, SessionState::ShuttingDown) {
            *state = SessionState::Failed(reason);
        }
    }
}

impl Drop for LaunchAttempt<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            log::warn!("⚠️ Browser launch abandoned by its caller");
            self.record_failure("launch abandoned".to_string());
        }
    }
}

// ============================================================================
// SessionManager
// ============================================================================

/// Lazily launched, self-healing, shared browser session.
///
/// # Thread Safety
///
/// All methods take `&self`; share it as `Arc<SessionManager>` (see
/// [`into_shared`](Self::into_shared)).
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// Create a builder for constructing a `SessionManager`.
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::new()
    }

    /// Wrap in an `Arc` for sharing between request tasks.
    pub fn into_shared(self) -> Arc<SessionManager> {
        Arc::new(self)
    }

    /// Open a fresh page on the shared browser.
    ///
    /// Launches the browser if none is running. A running browser is pinged
    /// first; if the ping or the page creation fails, the browser is
    /// discarded and exactly one relaunch is attempted.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ShuttingDown`] after [`shutdown`](Self::shutdown)
    /// - [`SessionError::BrowserCreation`] / [`SessionError::LaunchTimeout`] when
    ///   the launch fails
    /// - [`SessionError::PageCreation`] / [`SessionError::HealthCheckFailed`] when
    ///   the relaunched browser cannot open a page either
    pub async fn acquire_page(&self) -> Result<PageHandle> {
        let tracked = self.ensure_browser().await?;

        match self.open_page(&tracked).await {
            Ok(page) => Ok(self.wrap(page, &tracked)),
            Err(e) => {
                self.inner.invalidate(tracked.id(), &e.to_string());

                log::info!("Relaunching browser after failure on browser {}", tracked.id());
                let tracked = self.ensure_browser().await?;
                let page = self.open_page(&tracked).await.inspect_err(|e| {
                    log::error!("❌ Relaunched browser {} unusable: {}", tracked.id(), e);
                    self.inner.invalidate(tracked.id(), &e.to_string());
                })?;
                Ok(self.wrap(page, &tracked))
            }
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.inner.state().phase()
    }

    /// Snapshot of session statistics.
    pub fn stats(&self) -> SessionStats {
        let (phase, browser_age) = {
            let state = self.inner.state();
            let age = match &*state {
                SessionState::Ready(tracked) => Some(tracked.age()),
                _ => None,
            };
            (state.phase(), age)
        };

        SessionStats {
            phase,
            open_pages: self.inner.open_pages.load(Ordering::SeqCst),
            launches: self.inner.launches.load(Ordering::SeqCst),
            launch_failures: self.inner.launch_failures.load(Ordering::SeqCst),
            browser_age,
        }
    }

    /// Launch the browser ahead of the first request.
    ///
    /// Opens and closes one page to prove the browser works.
    pub async fn warmup(&self) -> Result<()> {
        log::info!(
            "Starting browser warmup (timeout: {}s)",
            self.inner.launch_timeout.as_secs()
        );

        match self.acquire_page().await {
            Ok(page) => {
                log::info!("✅ Warmup completed, browser {} ready", page.browser_id());
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Warmup failed: {}", e);
                Err(e)
            }
        }
    }

    /// Stop serving pages and release the browser.
    ///
    /// Pages already handed out stay usable until dropped; the process
    /// exits when the last of them is released. Idempotent.
    pub fn shutdown(&self) {
        if self.inner.shutting_down.swap(true, Ordering::SeqCst) {
            log::debug!("Session already shut down");
            return;
        }

        log::info!("Shutting down browser session...");
        let previous = std::mem::replace(&mut *self.inner.state(), SessionState::ShuttingDown);
        if let SessionState::Ready(tracked) = previous {
            log::debug!("Releasing browser {}", tracked.id());
        }

        log::info!(
            "Shutdown complete - open pages: {}",
            self.inner.open_pages.load(Ordering::SeqCst)
        );
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    /// Return the running browser, launching one if needed.
    async fn ensure_browser(&self) -> Result<TrackedBrowser> {
        if let Some(tracked) = self.inner.ready_browser()? {
            return Ok(tracked);
        }

        let _gate = self.inner.launch_gate.lock().await;

        // Another request may have launched while we waited.
        if let Some(tracked) = self.inner.ready_browser()? {
            log::trace!("Reusing browser {} launched by another request", tracked.id());
            return Ok(tracked);
        }

        self.launch().await
    }

    /// Launch a browser. Caller holds the launch gate.
    async fn launch(&self) -> Result<TrackedBrowser> {
        let attempt = LaunchAttempt::begin(&self.inner)?;
        let timeout = self.inner.launch_timeout;
        let factory = Arc::clone(&self.inner.factory);

        log::info!("Launching browser (timeout: {}s)...", timeout.as_secs());
        let result =
            tokio::time::timeout(timeout, tokio::task::spawn_blocking(move || factory.create()))
                .await;

        match result {
            Ok(Ok(Ok(browser))) => {
                let tracked = TrackedBrowser::new(browser);
                log::info!("✅ Browser {} ready", tracked.id());
                attempt.succeed(tracked)
            }
            Ok(Ok(Err(e))) => {
                log::error!("❌ Browser launch failed: {}", e);
                Err(attempt.fail(e))
            }
            Ok(Err(join_error)) => {
                log::error!("❌ Browser launch task failed: {}", join_error);
                Err(attempt.fail(SessionError::BrowserCreation(join_error.to_string())))
            }
            Err(_) => {
                log::error!("❌ Browser launch timed out after {}s", timeout.as_secs());
                Err(attempt.fail(SessionError::LaunchTimeout(timeout)))
            }
        }
    }

    /// Ping the browser and open a page on it, off the async runtime.
    async fn open_page(&self, tracked: &TrackedBrowser) -> Result<Box<dyn BrowserPage>> {
        let tracked = tracked.clone();
        tokio::task::spawn_blocking(move || {
            tracked.ping()?;
            tracked.browser().new_page()
        })
        .await
        .map_err(|e| SessionError::PageCreation(e.to_string()))?
    }

    fn wrap(&self, page: Box<dyn BrowserPage>, tracked: &TrackedBrowser) -> PageHandle {
        self.inner.open_pages.fetch_add(1, Ordering::SeqCst);
        PageHandle::new(
            page,
            tracked.id(),
            Arc::clone(tracked.browser()),
            Arc::clone(&self.inner.open_pages),
        )
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if !self.is_shutting_down() {
            log::debug!("SessionManager dropped without explicit shutdown - cleaning up");
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("stats", &self.stats())
            .field("launch_timeout", &self.inner.launch_timeout)
            .finish()
    }
}

// ============================================================================
// SessionManagerBuilder
// ============================================================================

/// Builder for [`SessionManager`].
///
/// ```rust,ignore
/// let sessions = SessionManager::builder()
///     .factory(Box::new(ChromeBrowserFactory::with_defaults()))
///     .launch_timeout(Duration::from_secs(20))
///     .build()?;
/// ```
pub struct SessionManagerBuilder {
    factory: Option<Box<dyn BrowserFactory>>,
    launch_timeout: Duration,
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self {
            factory: None,
            launch_timeout: DEFAULT_LAUNCH_TIMEOUT,
        }
    }

    /// Factory used for every launch. Required.
    pub fn factory(mut self, factory: Box<dyn BrowserFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    /// Build the manager. Does not launch a browser.
    ///
    /// # Errors
    ///
    /// [`SessionError::Configuration`] if no factory was given or the
    /// launch timeout is zero.
    pub fn build(self) -> Result<SessionManager> {
        let factory = self.factory.ok_or_else(|| {
            SessionError::Configuration("No browser factory provided".to_string())
        })?;

        if self.launch_timeout.is_zero() {
            return Err(SessionError::Configuration(
                "launch_timeout must be greater than 0".to_string(),
            ));
        }

        log::debug!(
            "Building session manager (launch timeout: {}s)",
            self.launch_timeout.as_secs()
        );

        Ok(SessionManager {
            inner: Arc::new(SessionInner {
                factory: Arc::from(factory),
                launch_timeout: self.launch_timeout,
                state: Mutex::new(SessionState::Uninitialized),
                launch_gate: tokio::sync::Mutex::new(()),
                open_pages: Arc::new(AtomicUsize::new(0)),
                launches: AtomicU64::new(0),
                launch_failures: AtomicU64::new(0),
                shutting_down: AtomicBool::new(false),
            }),
        })
    }
}

impl Default for SessionManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
