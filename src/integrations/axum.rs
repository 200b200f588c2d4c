//! Axum framework integration.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/print` | [`PrintService::handle`] on the raw body |
//! | `GET` | `/status` | `{"status": true}` |
//!
//! Every response passes through the allowed-origin middleware, which sets
//! `Access-Control-Allow-Origin` according to [`OriginPolicy`]. Preflight
//! (`OPTIONS`) requests are not handled here.
//!
//! `POST /print` bodies are capped at [`MAX_BODY_BYTES`]. A larger or
//! unreadable body is answered with the extractor's status (413 for the cap)
//! and the usual `{"message": ...}` error shape.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use url2pdf_api::integrations::axum::PrintServiceAxumExt;
//!
//! let app = service.into_router(vec!["https://app.example.com".to_string()]);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Graceful Shutdown
//!
//! ```rust,ignore
//! let sessions = Arc::clone(service.sessions());
//!
//! axum::serve(listener, app)
//!     .with_graceful_shutdown(async move {
//!         let _ = tokio::signal::ctrl_c().await;
//!         sessions.shutdown();
//!     })
//!     .await?;
//! ```

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};

use crate::service::{PrintReply, PrintService, StatusResponse};

/// Largest accepted `POST /print` body. Valid requests are a few hundred bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state of the print routes.
pub type PrintServiceState = State<Arc<PrintService>>;

/// Which request origins get an `Access-Control-Allow-Origin` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    /// `*` in `allowed` admits every origin.
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Header value for a request from `origin`, if any.
    ///
    /// ```rust
    /// use url2pdf_api::integrations::axum::OriginPolicy;
    ///
    /// let policy = OriginPolicy::new(vec!["https://app.example.com".to_string()]);
    /// assert_eq!(
    ///     policy.allow_origin(Some("https://app.example.com")).as_deref(),
    ///     Some("https://app.example.com")
    /// );
    /// assert_eq!(policy.allow_origin(Some("https://evil.example")), None);
    /// ```
    pub fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed.iter().any(|o| o == "*") {
            return Some("*".to_string());
        }

        origin
            .filter(|origin| self.allowed.iter().any(|o| o == origin))
            .map(str::to_string)
    }
}

/// Build the application router.
pub fn router(service: Arc<PrintService>, allowed_origins: Vec<String>) -> Router {
    let policy = Arc::new(OriginPolicy::new(allowed_origins));

    Router::new()
        .route("/print", post(print))
        .route("/status", get(status))
        .with_state(service)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(policy, allow_origin))
}

/// Extension trait for turning a [`PrintService`] into a router.
pub trait PrintServiceAxumExt {
    fn into_router(self, allowed_origins: Vec<String>) -> Router;
}

impl PrintServiceAxumExt for PrintService {
    fn into_router(self, allowed_origins: Vec<String>) -> Router {
        router(Arc::new(self), allowed_origins)
    }
}

impl PrintServiceAxumExt for Arc<PrintService> {
    fn into_router(self, allowed_origins: Vec<String>) -> Router {
        router(self, allowed_origins)
    }
}

async fn print(
    State(service): PrintServiceState,
    body: Result<Bytes, BytesRejection>,
) -> PrintReply {
    match body {
        Ok(body) => service.handle(&body).await,
        Err(rejection) => PrintReply::rejected(rejection.status().as_u16(), rejection.body_text()),
    }
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse::default())
}

async fn allow_origin(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;

    if let Some(value) = policy.allow_origin(origin.as_deref()) {
        let echoed = value != "*";
        if let Ok(value) = HeaderValue::from_str(&value) {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            if echoed {
                headers.append(header::VARY, HeaderValue::from_static("origin"));
            }
        }
    }

    response
}

impl IntoResponse for PrintReply {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(origins: &[&str]) -> OriginPolicy {
        OriginPolicy::new(origins.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_wildcard_policy() {
        let policy = policy(&["*"]);
        assert_eq!(policy.allow_origin(Some("https://a.example")).as_deref(), Some("*"));
        assert_eq!(policy.allow_origin(None).as_deref(), Some("*"));
    }

    #[test]
    fn test_exact_match_policy() {
        let policy = policy(&["https://a.example", "https://b.example"]);
        assert_eq!(
            policy.allow_origin(Some("https://b.example")).as_deref(),
            Some("https://b.example")
        );
        assert_eq!(policy.allow_origin(Some("https://a.example.evil")), None);
        assert_eq!(policy.allow_origin(None), None);
    }

    #[test]
    fn test_empty_policy() {
        assert_eq!(policy(&[]).allow_origin(Some("https://a.example")), None);
    }

    #[test]
    fn test_reply_status_mapping() {
        let response = PrintReply::from_result(Err(crate::service::PrintError::PdfCapture(
            "x".to_string(),
        )))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
