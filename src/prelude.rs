//! Convenient imports for common usage patterns.
//!
//! ```rust,ignore
//! use url2pdf_api::prelude::*;
//! ```
//!
//! This imports the service, its configuration, the session manager, the
//! factory and storage traits, and the error types, plus `Arc` which every
//! shared handle needs.

// Core types
pub use crate::config::{PrintServiceConfig, PrintServiceConfigBuilder};
pub use crate::error::{PageError, SessionError, StorageError};
pub use crate::factory::{BrowserFactory, ChromeBrowserFactory};
pub use crate::handle::PageHandle;
pub use crate::service::{
    Layout, Media, PaperFormat, PrintError, PrintReply, PrintRequest, PrintService, RenderOptions,
    StorageLocation,
};
pub use crate::session::SessionManager;
pub use crate::stats::{SessionPhase, SessionStats};
pub use crate::storage::{ArtifactPublisher, ArtifactStore};

// Feature-gated exports
#[cfg(feature = "env-config")]
pub use crate::config::env::{chrome_path_from_env, from_env};

#[cfg(all(feature = "env-config", feature = "s3-storage"))]
pub use crate::service::init_print_service;

#[cfg(feature = "axum-integration")]
pub use crate::integrations::axum::PrintServiceAxumExt;

pub use std::sync::Arc;
