//! Traits at the browser seam.
//!
//! - [`Healthcheck`]: liveness check of a running browser
//! - [`HeadlessBrowser`]: a running browser that opens pages
//! - [`BrowserPage`]: one isolated rendering context
//!
//! The Chrome implementations live in [`factory`](crate::factory); the
//! `test-utils` feature adds in-memory doubles.

mod browser;
mod healthcheck;

pub use browser::{BrowserPage, HeadlessBrowser, NavigationOutcome};
pub use healthcheck::Healthcheck;
