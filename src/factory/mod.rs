//! Browser factory implementations.
//!
//! This module provides the [`BrowserFactory`] trait and implementations
//! for launching the shared browser process.
//!
//! # Available Factories
//!
//! | Factory | Description |
//! |---------|-------------|
//! | [`ChromeBrowserFactory`] | Launches headless Chrome/Chromium |
//! | [`mock::MockBrowserFactory`] | In-memory browser for tests (feature-gated) |
//!
//! # Custom Factory
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use url2pdf_api::{BrowserFactory, HeadlessBrowser, Result};
//!
//! struct RemoteFactory {
//!     endpoint: String,
//! }
//!
//! impl BrowserFactory for RemoteFactory {
//!     fn create(&self) -> Result<Arc<dyn HeadlessBrowser>> {
//!         // connect to an already running browser
//!         todo!()
//!     }
//! }
//! ```

mod chrome;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chrome::{ChromeBrowser, ChromeBrowserFactory, ChromePage, create_chrome_options};

use std::sync::Arc;

use crate::error::Result;
use crate::traits::HeadlessBrowser;

/// Launches browser processes for the session manager.
///
/// `create` blocks until the browser is ready; the session manager calls
/// it on a blocking thread under its launch timeout.
///
/// # Thread Safety
///
/// Requires `Send + Sync` because the factory is shared by every request
/// task that may trigger a relaunch.
pub trait BrowserFactory: Send + Sync {
    /// Launch a new browser.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Configuration`](crate::SessionError::Configuration) for
    ///   invalid launch options
    /// - [`SessionError::BrowserCreation`](crate::SessionError::BrowserCreation) when
    ///   the binary is missing or the process fails to start
    fn create(&self) -> Result<Arc<dyn HeadlessBrowser>>;
}

/// Run a blocking cleanup call without holding up the async runtime.
///
/// Inside a tokio runtime `op` goes to the blocking pool and the caller
/// returns immediately. Outside one (plain threads, final teardown) it runs
/// inline.
pub(crate) fn release_blocking<F>(op: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(op);
        }
        Err(_) => op(),
    }
}
