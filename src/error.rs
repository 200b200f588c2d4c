//! Error types for the browser session, pages and artifact storage.
//!
//! This module provides [`SessionError`], the error type for every
//! browser session operation, together with the narrower [`PageError`]
//! (per-page navigation and capture) and [`StorageError`] (artifact
//! persistence). The service layer folds all of them into
//! [`PrintError`](crate::service::PrintError).
//!
//! # Example
//!
//! ```rust
//! use url2pdf_api::{SessionError, Result};
//!
//! fn open_session() -> Result<()> {
//!     Err(SessionError::Configuration("example error".to_string()))
//! }
//!
//! match open_session() {
//!     Ok(()) => println!("session ready"),
//!     Err(SessionError::ShuttingDown) => println!("service is shutting down"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::time::Duration;

/// Errors that can occur while managing the shared browser session.
///
/// Every variant except [`ShuttingDown`](Self::ShuttingDown) is transient:
/// the session manager moves to its `Failed` phase and the next acquisition
/// launches a fresh browser.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The browser process could not be launched.
    ///
    /// # Common Causes
    ///
    /// - Chrome/Chromium binary not found or not installed
    /// - Invalid Chrome binary path specified
    /// - Invalid or conflicting launch flags
    /// - System resource limits exceeded
    #[error("Failed to create browser: {0}")]
    BrowserCreation(String),

    /// The browser did not finish launching within the startup timeout.
    #[error("Browser launch timed out after {}s", .0.as_secs())]
    LaunchTimeout(Duration),

    /// A page (tab) could not be opened on the running browser.
    #[error("Failed to open page: {0}")]
    PageCreation(String),

    /// The running browser failed its health ping.
    ///
    /// The session manager discards the browser and relaunches, so callers
    /// normally never see this variant.
    #[error("Browser health check failed: {0}")]
    HealthCheckFailed(String),

    /// Operation attempted after [`SessionManager::shutdown`](crate::SessionManager::shutdown).
    #[error("Session manager is shutting down")]
    ShuttingDown,

    /// Invalid configuration provided.
    ///
    /// # Common Causes
    ///
    /// - A timeout set to zero
    /// - `load_timeout` longer than `request_deadline`
    /// - No browser factory given to the session builder
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Convenience conversion from [`String`] to [`SessionError::Configuration`].
///
/// ```rust
/// use url2pdf_api::SessionError;
///
/// let error: SessionError = "invalid configuration".to_string().into();
/// assert!(matches!(error, SessionError::Configuration(_)));
/// ```
impl From<String> for SessionError {
    fn from(msg: String) -> Self {
        SessionError::Configuration(msg)
    }
}

/// Convenience conversion from `&str` to [`SessionError::Configuration`].
impl From<&str> for SessionError {
    fn from(msg: &str) -> Self {
        SessionError::Configuration(msg.to_string())
    }
}

/// Errors raised by a single browser page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// Navigation failed (DNS, TLS, connection refused, aborted load).
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The page did not reach its load-complete state in time.
    #[error("Navigation timed out: {0}")]
    Timeout(String),

    /// PDF capture failed after navigation succeeded.
    #[error("PDF capture failed: {0}")]
    Capture(String),

    /// The page was already closed.
    #[error("Page is closed")]
    Closed,
}

/// Errors raised while persisting an artifact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The object store rejected or failed the write.
    #[error("Failed to write object {key}: {reason}")]
    Write {
        /// Storage key that was being written.
        key: String,
        /// Backend-specific failure detail.
        reason: String,
    },
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;

// ============================================================================
// Unit Tests
// ============================================================================
