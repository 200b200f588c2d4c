//! Web framework integrations.
//!
//! The print pipeline itself is framework-agnostic
//! ([`PrintService`](crate::service::PrintService)); this module adapts it
//! to HTTP frameworks.
//!
//! | Feature | Module | Provides |
//! |---------|--------|----------|
//! | `axum-integration` | [`axum`] | `POST /print`, `GET /status`, allowed-origin header |
//!
//! # Example
//!
//! ```rust,ignore
//! use url2pdf_api::integrations::axum::router;
//!
//! let app = router(service, config.allowed_origins.clone());
//! let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
//! axum::serve(listener, app).await?;
//! ```

#[cfg(feature = "axum-integration")]
pub mod axum;
