//! Health check trait for browser sessions.
//!
//! The session manager pings the running browser before handing out a
//! page. A failed ping discards the browser and triggers one relaunch.

use crate::error::Result;

/// Trait for browser-like objects that support health checking.
///
/// # Thread Safety
///
/// Requires `Send + Sync` because the shared browser is pinged from
/// whichever request task acquires a page next.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use url2pdf_api::{Healthcheck, Result, SessionError};
///
/// struct MyBrowser {
///     inner: SomeBrowserType,
/// }
///
/// impl Healthcheck for MyBrowser {
///     fn ping(&self) -> Result<()> {
///         self.inner
///             .version()
///             .map(|_| ())
///             .map_err(|e| SessionError::HealthCheckFailed(e.to_string()))
///     }
/// }
/// ```
///
/// # How It's Used
///
/// ```text
/// acquire_page()
///       │
///       ├─── ping() ──→ ✓ OK ──→ open page on running browser
///       │
///       └─── ping() ──→ ✗ Failed ──→ discard, relaunch once
/// ```
pub trait Healthcheck: Send + Sync {
    /// Perform a lightweight liveness check.
    ///
    /// Must be cheap and must not leave pages open behind it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::HealthCheckFailed`](crate::SessionError::HealthCheckFailed)
    /// when the browser process is gone or its control channel is broken.
    fn ping(&self) -> Result<()>;
}
