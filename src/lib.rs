//! # url2pdf-api
//!
//! Render web pages to PDF with one shared headless Chrome session and
//! publish the result to object storage.
//!
//! A caller posts `{"url": ..., "file_name": ...}` plus optional print
//! settings. The request is validated, the browser is launched on first
//! use (and relaunched if it dies), the page is captured as PDF, and the
//! document is stored under a unique key. The caller gets back the public
//! URL of the stored object.
//!
//! ## Features
//!
//! - **Strict Validation**: Every field is checked before any browser work starts
//! - **Lazy Shared Browser**: One Chrome instance, launched once even under a cold-start burst
//! - **Self-Healing**: A crashed browser is discarded and replaced on the next request
//! - **RAII Pages**: Pages close when their [`PageHandle`] drops, including on timeout
//! - **Bounded Requests**: Page load timeout plus an overall request deadline
//! - **Pluggable Storage**: S3 in production, in-memory for tests
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │         HTTP (integrations::axum)           │
//! │      POST /print          GET /status       │
//! └─────────────────┬───────────────────────────┘
//!                   │ raw body
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │               PrintService                  │
//! │  validate ─→ resolve options ─→ render      │
//! │                                  │          │
//! │                publish ←─────────┘          │
//! └───────┬───────────────────────────┬─────────┘
//!         │                           │
//!         ▼                           ▼
//! ┌───────────────────┐     ┌───────────────────┐
//! │  SessionManager   │     │  ArtifactStore    │
//! │  (one browser,    │     │  (S3 / memory)    │
//! │   many pages)     │     │                   │
//! └───────────────────┘     └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use url2pdf_api::prelude::*;
//! use url2pdf_api::storage::s3::S3ArtifactStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PrintServiceConfigBuilder::new()
//!         .bucket("rendered-pdfs")
//!         .build()?;
//!
//!     let store = S3ArtifactStore::from_env("rendered-pdfs", None).await;
//!     let service = PrintService::from_config(
//!         &config,
//!         Box::new(ChromeBrowserFactory::with_defaults()),
//!         Arc::new(store),
//!     )?;
//!
//!     let location = service
//!         .print(br#"{"url":"https://example.com","file_name":"example.pdf"}"#)
//!         .await?;
//!     println!("{}", location.url);
//!
//!     service.sessions().shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Configuration
//!
//! With `env-config` and `s3-storage` enabled, [`init_print_service`] builds
//! the whole service from environment variables (and an optional `app.env`
//! file):
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "env-config", feature = "s3-storage"))]
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (service, config) = url2pdf_api::init_print_service().await?;
//! println!("listening on {}", config.bind_address);
//! # Ok(())
//! # }
//! ```
//!
//! | Variable | Type | Default | Description |
//! |----------|------|---------|-------------|
//! | `PRINT_BUCKET` | String | required | Target bucket |
//! | `PRINT_PUBLIC_BASE_URL` | String | bucket URL | Base of returned URLs |
//! | `PRINT_KEY_PREFIX` | String | none | Prefix for object keys |
//! | `PRINT_UNIQUE_KEYS` | bool | true | Prefix keys with a random token |
//! | `ALLOWED_ORIGINS` | list | `*` | Comma-separated CORS origins |
//! | `BROWSER_LAUNCH_TIMEOUT_SECONDS` | u64 | 30 | Browser launch bound |
//! | `PAGE_LOAD_TIMEOUT_SECONDS` | u64 | 30 | Navigation bound |
//! | `REQUEST_DEADLINE_SECONDS` | u64 | 60 | Whole-request bound |
//! | `BROWSER_WARMUP` | bool | false | Launch Chrome at startup |
//! | `BIND_ADDRESS` | String | `0.0.0.0:3000` | Server listen address |
//! | `CHROME_PATH` | String | auto | Custom Chrome binary path |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `env-config` | Environment-based configuration |
//! | `axum-integration` | Axum routes (`POST /print`, `GET /status`) |
//! | `s3-storage` | S3 artifact store |
//! | `server` | All of the above plus the `url2pdf-server` binary |
//! | `test-utils` | Mock browser factory and in-memory store |
//!
//! ## Error Handling
//!
//! The pipeline returns [`PrintError`]. Validation failures map to HTTP 400
//! with a field-specific message; everything else maps to HTTP 500 with a
//! generic message while the detail is logged:
//!
//! ```rust,ignore
//! use url2pdf_api::PrintError;
//!
//! match service.print(body).await {
//!     Ok(location) => println!("{}", location.url),
//!     Err(PrintError::Validation(e)) => eprintln!("bad request ({}): {}", e.field(), e),
//!     Err(e) => eprintln!("render failed [{}]: {}", e.error_code(), e),
//! }
//! ```
//!
//! ## Testing
//!
//! Enable `test-utils` to run the pipeline without Chrome or S3:
//!
//! ```rust,ignore
//! use url2pdf_api::factory::mock::MockBrowserFactory;
//! use url2pdf_api::storage::memory::MemoryArtifactStore;
//!
//! let service = PrintService::from_config(
//!     &config,
//!     Box::new(MockBrowserFactory::new()),
//!     Arc::new(MemoryArtifactStore::new()),
//! )?;
//! ```

#![doc(html_root_url = "https://docs.rs/url2pdf-api/0.1.0")]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod factory;
pub mod handle;
pub mod prelude;
pub mod service;
pub mod session;
pub mod stats;
pub mod storage;
pub mod traits;

// Internal modules (not publicly exposed)
pub(crate) mod tracked;

// ============================================================================
// Feature-gated modules
// ============================================================================

/// Web framework integrations.
///
/// Enable `axum-integration` to get the HTTP routes.
#[cfg(feature = "axum-integration")]
pub mod integrations;

// ============================================================================
// Re-exports (Public API)
// ============================================================================

// Core types
pub use config::{PrintServiceConfig, PrintServiceConfigBuilder};
pub use error::{PageError, Result, SessionError, StorageError};
pub use factory::{BrowserFactory, ChromeBrowserFactory, create_chrome_options};
pub use handle::PageHandle;
pub use service::{
    PrintError, PrintReply, PrintRequest, PrintService, RenderOptions, StorageLocation,
};
pub use session::{SessionManager, SessionManagerBuilder};
pub use stats::{SessionPhase, SessionStats};
pub use storage::{ArtifactPublisher, ArtifactStore};
pub use traits::{BrowserPage, Healthcheck, HeadlessBrowser, NavigationOutcome};

// Feature-gated re-exports
#[cfg(feature = "env-config")]
pub use config::env::{chrome_path_from_env, from_env};

#[cfg(all(feature = "env-config", feature = "s3-storage"))]
pub use service::init_print_service;
