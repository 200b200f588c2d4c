//! Print service module.
//!
//! This module is the **framework-agnostic core** of the print pipeline:
//! request types, validation, rendering, and the mapping of outcomes to
//! HTTP replies. Web framework glue lives in
//! [`integrations`](crate::integrations).
//!
//! # Module Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     service module (this module)                 │
//! │                                                                  │
//! │  validate.rs ──→ types.rs ──→ render.rs ──→ response.rs          │
//! │  parse_request   RenderOptions  render_page   PrintReply         │
//! │                                                                  │
//! │                       print.rs: PrintService                     │
//! └──────────────────────────────────────────────────────────────────┘
//!                               │ used by
//!                               ▼
//!                  integrations::axum (POST /print, GET /status)
//! ```
//!
//! # Design Philosophy
//!
//! | Layer | Responsibility | This Module? |
//! |-------|----------------|--------------|
//! | **Service** | Validation, rendering, publishing | ✅ Yes |
//! | **Handler** | HTTP request/response mapping, framework glue | ❌ No (integrations) |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use url2pdf_api::service::PrintService;
//!
//! let service = Arc::new(PrintService::from_config(&config, factory, store)?);
//!
//! let reply = service
//!     .handle(br#"{"url":"https://example.com","file_name":"out.pdf"}"#)
//!     .await;
//! assert_eq!(reply.status(), 200);
//! ```

mod print;
mod render;
mod response;
mod types;
pub(crate) mod validate;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::{
    ErrorResponse, Layout, Length, Margin, Media, PDF_CONTENT_TYPE, PaperFormat, PdfArtifact,
    PrintError, PrintRequest, PrintResponse, RenderOptions, StatusResponse, StorageLocation,
    ValidationError,
};

pub use print::PrintService;
pub use render::render_page;
pub use response::{GENERIC_FAILURE_MESSAGE, PrintReply};
pub use validate::{
    KNOWN_FIELDS, MAX_FILE_NAME_LEN, MAX_SCALE, MIN_SCALE, parse_request, validate_request,
};

#[cfg(all(feature = "env-config", feature = "s3-storage"))]
pub use print::init_print_service;
