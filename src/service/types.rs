//! Request, response, and error types for the print service.
//!
//! These types are framework-agnostic and define the wire contract of
//! `POST /print` and `GET /status`.
//!
//! # Overview
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`PrintRequest`] | Validated print request |
//! | [`RenderOptions`] | Fully resolved rendering configuration |
//! | [`PdfArtifact`] | Rendered PDF bytes |
//! | [`PrintResponse`] | Success body `{url}` |
//! | [`ErrorResponse`] | Failure body `{message}` |
//! | [`StatusResponse`] | Liveness body `{status}` |
//! | [`ValidationError`] | First violated request constraint |
//! | [`PrintError`] | Terminal error of the pipeline |

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PageError, SessionError, StorageError};

/// MIME type of every artifact produced by the renderer.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

// ============================================================================
// Print Options
// ============================================================================

/// CSS media type emulated while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Media {
    /// Render with `@media screen` rules.
    Screen,
    /// Render with `@media print` rules.
    #[default]
    Print,
}

impl Media {
    /// Accepted wire values.
    pub const NAMES: [&'static str; 2] = ["screen", "print"];

    /// Parse a wire value (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "screen" => Some(Self::Screen),
            "print" => Some(Self::Print),
            _ => None,
        }
    }

    /// Wire value of this media type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Print => "print",
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperFormat {
    Letter,
    Legal,
    Tabloid,
    Ledger,
    A0,
    A1,
    A2,
    A3,
    #[default]
    A4,
    A5,
    A6,
}

impl PaperFormat {
    /// Every supported format, in documentation order.
    pub const ALL: [PaperFormat; 11] = [
        Self::Letter,
        Self::Legal,
        Self::Tabloid,
        Self::Ledger,
        Self::A0,
        Self::A1,
        Self::A2,
        Self::A3,
        Self::A4,
        Self::A5,
        Self::A6,
    ];

    /// Parse a format name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical name of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Letter => "Letter",
            Self::Legal => "Legal",
            Self::Tabloid => "Tabloid",
            Self::Ledger => "Ledger",
            Self::A0 => "A0",
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::A4 => "A4",
            Self::A5 => "A5",
            Self::A6 => "A6",
        }
    }

    /// Portrait `(width, height)` in inches.
    pub fn dimensions_inches(&self) -> (f64, f64) {
        match self {
            Self::Letter => (8.5, 11.0),
            Self::Legal => (8.5, 14.0),
            Self::Tabloid => (11.0, 17.0),
            Self::Ledger => (17.0, 11.0),
            Self::A0 => (33.1, 46.8),
            Self::A1 => (23.4, 33.1),
            Self::A2 => (16.54, 23.4),
            Self::A3 => (11.7, 16.54),
            Self::A4 => (8.27, 11.7),
            Self::A5 => (5.83, 8.27),
            Self::A6 => (4.13, 5.83),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Portrait,
    Landscape,
}

impl Layout {
    /// Accepted wire values.
    pub const NAMES: [&'static str; 2] = ["portrait", "landscape"];

    /// Parse a wire value (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "portrait" => Some(Self::Portrait),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }

    /// Whether this layout maps to the browser's landscape flag.
    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::Landscape)
    }
}

/// A CSS length as supplied by the caller, with its value in inches.
///
/// Accepts a non-negative number followed by `px`, `in`, `cm`, `mm`, or
/// nothing (pixels at 96 per inch).
#[derive(Debug, Clone, PartialEq)]
pub struct Length {
    raw: String,
    inches: f64,
}

impl Length {
    /// Parse a measurement string.
    ///
    /// ```rust
    /// use url2pdf_api::service::Length;
    ///
    /// assert_eq!(Length::parse("1in").unwrap().inches(), 1.0);
    /// assert_eq!(Length::parse("96px").unwrap().inches(), 1.0);
    /// assert!(Length::parse("-2mm").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (number, divisor) = if let Some(n) = trimmed.strip_suffix("px") {
            (n, 96.0)
        } else if let Some(n) = trimmed.strip_suffix("in") {
            (n, 1.0)
        } else if let Some(n) = trimmed.strip_suffix("cm") {
            (n, 2.54)
        } else if let Some(n) = trimmed.strip_suffix("mm") {
            (n, 25.4)
        } else {
            (trimmed, 96.0)
        };

        let number = number.trim();
        // Reject forms f64::from_str accepts but CSS does not ("inf", "1e3", "+1")
        if number.is_empty()
            || !number
                .chars()
                .all(|c| c.is_ascii_digit() || c == '.')
        {
            return None;
        }

        let value: f64 = number.parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }

        Some(Self {
            raw: trimmed.to_string(),
            inches: value / divisor,
        })
    }

    /// The caller-supplied representation.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Value in inches.
    pub fn inches(&self) -> f64 {
        self.inches
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Four-sided page margin. All sides are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Margin {
    pub top: Length,
    pub bottom: Length,
    pub left: Length,
    pub right: Length,
}

// ============================================================================
// Request Types
// ============================================================================

/// A structurally valid print request.
///
/// Produced only by [`validate_request`](crate::service::validate_request);
/// optional fields stay `None` until [`RenderOptions::resolve`] applies
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintRequest {
    /// Absolute `http`/`https` URL of the page to render.
    pub url: Url,

    /// Requested artifact name, ending in `.pdf`.
    pub file_name: String,

    pub media: Option<Media>,

    pub format: Option<PaperFormat>,

    pub background: Option<bool>,

    pub layout: Option<Layout>,

    pub margin: Option<Margin>,

    pub scale: Option<f64>,
}

impl PrintRequest {
    /// Minimal request with every optional field absent.
    pub fn new(url: Url, file_name: impl Into<String>) -> Self {
        Self {
            url,
            file_name: file_name.into(),
            media: None,
            format: None,
            background: None,
            layout: None,
            margin: None,
            scale: None,
        }
    }
}

/// Fully resolved rendering configuration.
///
/// [`Default`] yields the documented defaults: print media, A4, backgrounds
/// on, portrait, no margins, scale 1.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub media: Media,
    pub format: PaperFormat,
    pub background: bool,
    pub layout: Layout,
    pub margin: Option<Margin>,
    pub scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            media: Media::Print,
            format: PaperFormat::A4,
            background: true,
            layout: Layout::Portrait,
            margin: None,
            scale: 1.0,
        }
    }
}

impl RenderOptions {
    /// Merge a request's options with the defaults. Total: never fails.
    pub fn resolve(request: &PrintRequest) -> Self {
        let defaults = Self::default();
        Self {
            media: request.media.unwrap_or(defaults.media),
            format: request.format.unwrap_or(defaults.format),
            background: request.background.unwrap_or(defaults.background),
            layout: request.layout.unwrap_or(defaults.layout),
            margin: request.margin.clone(),
            scale: request.scale.unwrap_or(defaults.scale),
        }
    }

    /// Landscape flag passed to the browser.
    pub fn is_landscape(&self) -> bool {
        self.layout.is_landscape()
    }
}

impl From<&PrintRequest> for RenderOptions {
    fn from(request: &PrintRequest) -> Self {
        Self::resolve(request)
    }
}

// ============================================================================
// Artifact Types
// ============================================================================

/// Rendered PDF bytes.
///
/// Produced once per request and consumed by the publisher.
#[derive(Clone)]
pub struct PdfArtifact {
    bytes: Vec<u8>,
}

impl PdfArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Always [`PDF_CONTENT_TYPE`].
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Debug for PdfArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfArtifact")
            .field("content_type", &PDF_CONTENT_TYPE)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Where an artifact was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    /// Object key inside the bucket.
    pub key: String,

    /// Publicly resolvable URL of the object.
    pub url: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Success body of `POST /print`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintResponse {
    pub url: String,
}

impl From<StorageLocation> for PrintResponse {
    fn from(location: StorageLocation) -> Self {
        Self { url: location.url }
    }
}

/// Failure body of `POST /print`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorResponse {
    pub message: String,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: bool,
}

impl Default for StatusResponse {
    fn default() -> Self {
        Self { status: true }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// The first constraint a print request violated.
///
/// The message always names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field (`body` for the payload itself).
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Terminal error of the print pipeline.
///
/// Only [`Validation`](Self::Validation) is reported to the caller verbatim;
/// every other variant becomes a generic server error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PrintError {
    /// The request was malformed or out of contract.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// No browser session could be established.
    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),

    /// The target page could not be loaded or answered with an error status.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The target page did not finish loading in time.
    #[error("Navigation timeout: {0}")]
    NavigationTimeout(String),

    /// PDF capture failed after navigation succeeded.
    #[error("PDF capture failed: {0}")]
    PdfCapture(String),

    /// The artifact was rendered but could not be persisted.
    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    /// The overall request deadline elapsed.
    #[error("Request deadline of {}s exceeded", .0.as_secs())]
    DeadlineExceeded(Duration),
}

impl PrintError {
    /// HTTP status for this error: 400 for validation, 500 otherwise.
    ///
    /// Every server-side kind maps to the same status.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            _ => 500,
        }
    }

    /// Machine-readable identifier, used in logs only.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BrowserUnavailable(_) => "BROWSER_UNAVAILABLE",
            Self::Navigation(_) => "NAVIGATION_FAILED",
            Self::NavigationTimeout(_) => "NAVIGATION_TIMEOUT",
            Self::PdfCapture(_) => "PDF_CAPTURE_FAILED",
            Self::StorageWrite(_) => "STORAGE_WRITE_FAILED",
            Self::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<SessionError> for PrintError {
    fn from(err: SessionError) -> Self {
        Self::BrowserUnavailable(err.to_string())
    }
}

impl From<StorageError> for PrintError {
    fn from(err: StorageError) -> Self {
        Self::StorageWrite(err.to_string())
    }
}

impl From<PageError> for PrintError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Navigation(msg) => Self::Navigation(msg),
            PageError::Timeout(msg) => Self::NavigationTimeout(msg),
            PageError::Capture(msg) => Self::PdfCapture(msg),
            PageError::Closed => Self::PdfCapture("page closed before capture".to_string()),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PrintRequest {
        PrintRequest::new(Url::parse("https://example.com").unwrap(), "out.pdf")
    }

    #[test]
    fn test_render_options_defaults() {
        let options = RenderOptions::resolve(&request());

        assert_eq!(options, RenderOptions::default());
        assert_eq!(options.media, Media::Print);
        assert_eq!(options.format, PaperFormat::A4);
        assert!(options.background);
        assert_eq!(options.layout, Layout::Portrait);
        assert!(options.margin.is_none());
        assert_eq!(options.scale, 1.0);
    }

    /// Each optional field, when present, overrides only itself.
    #[test]
    fn test_render_options_each_field_independently() {
        let margin = Margin {
            top: Length::parse("1cm").unwrap(),
            bottom: Length::parse("2cm").unwrap(),
            left: Length::parse("0").unwrap(),
            right: Length::parse("10px").unwrap(),
        };

        let cases: Vec<(PrintRequest, RenderOptions)> = vec![
            (
                PrintRequest { media: Some(Media::Screen), ..request() },
                RenderOptions { media: Media::Screen, ..Default::default() },
            ),
            (
                PrintRequest { format: Some(PaperFormat::Letter), ..request() },
                RenderOptions { format: PaperFormat::Letter, ..Default::default() },
            ),
            (
                PrintRequest { background: Some(false), ..request() },
                RenderOptions { background: false, ..Default::default() },
            ),
            (
                PrintRequest { layout: Some(Layout::Landscape), ..request() },
                RenderOptions { layout: Layout::Landscape, ..Default::default() },
            ),
            (
                PrintRequest { margin: Some(margin.clone()), ..request() },
                RenderOptions { margin: Some(margin), ..Default::default() },
            ),
            (
                PrintRequest { scale: Some(0.5), ..request() },
                RenderOptions { scale: 0.5, ..Default::default() },
            ),
        ];

        for (request, expected) in cases {
            assert_eq!(RenderOptions::from(&request), expected, "request: {:?}", request);
        }
    }

    #[test]
    fn test_landscape_flag() {
        let options = RenderOptions {
            layout: Layout::Landscape,
            ..Default::default()
        };
        assert!(options.is_landscape());
        assert!(!RenderOptions::default().is_landscape());
    }

    #[test]
    fn test_paper_format_names() {
        assert_eq!(PaperFormat::from_name("a4"), Some(PaperFormat::A4));
        assert_eq!(PaperFormat::from_name("LETTER"), Some(PaperFormat::Letter));
        assert_eq!(PaperFormat::from_name("A7"), None);
        for format in PaperFormat::ALL {
            assert_eq!(PaperFormat::from_name(format.as_str()), Some(format));
        }
    }

    #[test]
    fn test_paper_dimensions() {
        assert_eq!(PaperFormat::Letter.dimensions_inches(), (8.5, 11.0));
        assert_eq!(PaperFormat::A4.dimensions_inches(), (8.27, 11.7));
    }

    #[test]
    fn test_length_units() {
        assert_eq!(Length::parse("1in").unwrap().inches(), 1.0);
        assert_eq!(Length::parse("2.54cm").unwrap().inches(), 1.0);
        assert_eq!(Length::parse("25.4mm").unwrap().inches(), 1.0);
        assert_eq!(Length::parse("48px").unwrap().inches(), 0.5);
        assert_eq!(Length::parse("192").unwrap().inches(), 2.0);
        assert_eq!(Length::parse(" 10mm ").unwrap().as_str(), "10mm");
    }

    #[test]
    fn test_length_rejects_invalid() {
        for raw in ["", "mm", "-1in", "abc", "1pt", "inf", "1e3px", "+1in", "NaN"] {
            assert!(Length::parse(raw).is_none(), "{:?} should be rejected", raw);
        }
    }

    #[test]
    fn test_artifact_content_type() {
        let artifact = PdfArtifact::new(b"%PDF-1.4".to_vec());
        assert_eq!(artifact.content_type(), "application/pdf");
        assert_eq!(artifact.len(), 8);
        assert!(!artifact.is_empty());
        assert!(format!("{:?}", artifact).contains("size: 8"));
    }

    #[test]
    fn test_error_status_codes() {
        let validation = PrintError::from(ValidationError::new("url", "url is required"));
        assert_eq!(validation.status_code(), 400);
        assert!(validation.is_client_error());

        for error in [
            PrintError::BrowserUnavailable(String::new()),
            PrintError::Navigation(String::new()),
            PrintError::NavigationTimeout(String::new()),
            PrintError::PdfCapture(String::new()),
            PrintError::StorageWrite(String::new()),
            PrintError::DeadlineExceeded(Duration::from_secs(1)),
        ] {
            assert_eq!(error.status_code(), 500, "{}", error.error_code());
            assert!(!error.is_client_error());
        }
    }

    #[test]
    fn test_page_error_conversion() {
        assert!(matches!(
            PrintError::from(PageError::Navigation("dns".into())),
            PrintError::Navigation(_)
        ));
        assert!(matches!(
            PrintError::from(PageError::Timeout("slow".into())),
            PrintError::NavigationTimeout(_)
        ));
        assert!(matches!(
            PrintError::from(PageError::Capture("crash".into())),
            PrintError::PdfCapture(_)
        ));
        assert!(matches!(
            PrintError::from(PageError::Closed),
            PrintError::PdfCapture(_)
        ));
    }

    #[test]
    fn test_response_shapes() {
        let ok = serde_json::to_value(PrintResponse {
            url: "https://b.example/x/out.pdf".to_string(),
        })
        .unwrap();
        assert_eq!(ok, serde_json::json!({"url": "https://b.example/x/out.pdf"}));

        let err = serde_json::to_value(ErrorResponse {
            message: "render failed".to_string(),
        })
        .unwrap();
        assert_eq!(err, serde_json::json!({"message": "render failed"}));

        let status = serde_json::to_value(StatusResponse::default()).unwrap();
        assert_eq!(status, serde_json::json!({"status": true}));

        let extra: Result<ErrorResponse, _> =
            serde_json::from_value(serde_json::json!({"message": "x", "code": "y"}));
        assert!(extra.is_err(), "ErrorResponse admits no extra fields");
    }
}
