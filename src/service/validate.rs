//! Print request validation.
//!
//! Turns an untrusted JSON body into a [`PrintRequest`] or the first
//! [`ValidationError`] it finds. Checks run in a fixed order so the same
//! bad input always yields the same error:
//!
//! | # | Check | `field` |
//! |---|-------|---------|
//! | 1 | body is JSON and an object | `body` |
//! | 2 | `url` present | `url` |
//! | 3 | `file_name` present | `file_name` |
//! | 4 | `url` is an absolute `http`/`https` URL | `url` |
//! | 5 | `file_name` is a safe name ending in `.pdf` | `file_name` |
//! | 6 | `media` | `media` |
//! | 7 | `format` | `format` |
//! | 8 | `background` is a boolean | `background` |
//! | 9 | `layout` | `layout` |
//! | 10 | `margin` has exactly four valid sides | `margin`, `margin.<side>` |
//! | 11 | `scale` is a number in `0.1..=2.0` | `scale` |
//! | 12 | no unknown top-level fields | the unknown field |
//!
//! An optional field set to `null` is treated as absent.
//!
//! Validation has no side effects and never touches the browser.

use serde_json::{Map, Value};
use url::Url;

use super::types::{Layout, Length, Margin, Media, PaperFormat, PrintRequest, ValidationError};

/// Top-level fields a request may carry.
pub const KNOWN_FIELDS: [&str; 8] = [
    "url",
    "file_name",
    "media",
    "format",
    "background",
    "layout",
    "margin",
    "scale",
];

const MARGIN_SIDES: [&str; 4] = ["top", "bottom", "left", "right"];

/// Smallest scale Chrome accepts for PDF capture.
pub const MIN_SCALE: f64 = 0.1;

/// Largest scale Chrome accepts for PDF capture.
pub const MAX_SCALE: f64 = 2.0;

/// Longest accepted `file_name`, in characters.
pub const MAX_FILE_NAME_LEN: usize = 255;

type Fields = Map<String, Value>;

/// Parse and validate a raw request body.
///
/// ```rust
/// use url2pdf_api::service::parse_request;
///
/// let request = parse_request(br#"{"url":"https://example.com","file_name":"out.pdf"}"#).unwrap();
/// assert_eq!(request.file_name, "out.pdf");
///
/// let err = parse_request(br#"{"file_name":"out.pdf"}"#).unwrap_err();
/// assert_eq!(err.field(), "url");
/// ```
pub fn parse_request(body: &[u8]) -> Result<PrintRequest, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::new("body", format!("body must be valid JSON: {}", e)))?;
    validate_request(&value)
}

/// Validate an already parsed JSON value.
pub fn validate_request(value: &Value) -> Result<PrintRequest, ValidationError> {
    let fields = value
        .as_object()
        .ok_or_else(|| ValidationError::new("body", "body must be a JSON object"))?;

    let url = required(fields, "url")?;
    let file_name = required(fields, "file_name")?;

    let url = validate_url(url)?;
    let file_name = validate_file_name(file_name)?;

    let request = PrintRequest {
        url,
        file_name,
        media: optional(fields, "media", validate_media)?,
        format: optional(fields, "format", validate_format)?,
        background: optional(fields, "background", validate_background)?,
        layout: optional(fields, "layout", validate_layout)?,
        margin: optional(fields, "margin", validate_margin)?,
        scale: optional(fields, "scale", validate_scale)?,
    };

    if let Some(unknown) = fields.keys().find(|k| !KNOWN_FIELDS.contains(&k.as_str())) {
        return Err(ValidationError::new(
            unknown.as_str(),
            format!("unknown field '{}'", unknown),
        ));
    }

    Ok(request)
}

fn required<'a>(fields: &'a Fields, name: &str) -> Result<&'a Value, ValidationError> {
    match fields.get(name) {
        Some(Value::Null) | None => Err(ValidationError::new(name, format!("{} is required", name))),
        Some(value) => Ok(value),
    }
}

fn optional<T>(
    fields: &Fields,
    name: &str,
    check: fn(&Value) -> Result<T, ValidationError>,
) -> Result<Option<T>, ValidationError> {
    match fields.get(name) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => check(value).map(Some),
    }
}

// ============================================================================
// Field Checks
// ============================================================================

fn validate_url(value: &Value) -> Result<Url, ValidationError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ValidationError::new("url", "url must be a string"))?;

    let url = Url::parse(raw.trim()).map_err(|e| {
        ValidationError::new("url", format!("url must be an absolute URL: {}", e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::new(
            "url",
            format!("url must use http or https, got '{}'", other),
        )),
    }
}

fn validate_file_name(value: &Value) -> Result<String, ValidationError> {
    let name = value
        .as_str()
        .ok_or_else(|| ValidationError::new("file_name", "file_name must be a string"))?;

    let fail = |message: &str| Err(ValidationError::new("file_name", message));

    if name.is_empty() || name.chars().count() > MAX_FILE_NAME_LEN {
        return fail("file_name must be between 1 and 255 characters");
    }
    if !name.chars().all(is_file_name_char) {
        return fail("file_name may only contain letters, digits, '.', '_' and '-'");
    }
    if name.starts_with('.') {
        return fail("file_name must not start with '.'");
    }
    match name.strip_suffix(".pdf") {
        None => fail("file_name must end with .pdf"),
        Some("") => fail("file_name must have a name before .pdf"),
        Some(_) => Ok(name.to_string()),
    }
}

/// Characters allowed in file names and storage key segments.
pub(crate) fn is_file_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn validate_media(value: &Value) -> Result<Media, ValidationError> {
    value.as_str().and_then(Media::from_name).ok_or_else(|| {
        ValidationError::new(
            "media",
            format!("media must be one of: {}", Media::NAMES.join(", ")),
        )
    })
}

fn validate_format(value: &Value) -> Result<PaperFormat, ValidationError> {
    value.as_str().and_then(PaperFormat::from_name).ok_or_else(|| {
        let names: Vec<&str> = PaperFormat::ALL.iter().map(|f| f.as_str()).collect();
        ValidationError::new(
            "format",
            format!("format must be one of: {}", names.join(", ")),
        )
    })
}

fn validate_background(value: &Value) -> Result<bool, ValidationError> {
    value
        .as_bool()
        .ok_or_else(|| ValidationError::new("background", "background must be a boolean"))
}

fn validate_layout(value: &Value) -> Result<Layout, ValidationError> {
    value.as_str().and_then(Layout::from_name).ok_or_else(|| {
        ValidationError::new(
            "layout",
            format!("layout must be one of: {}", Layout::NAMES.join(", ")),
        )
    })
}

fn validate_margin(value: &Value) -> Result<Margin, ValidationError> {
    let sides = value
        .as_object()
        .ok_or_else(|| ValidationError::new("margin", "margin must be an object"))?;

    let side = |name: &str| -> Result<Length, ValidationError> {
        let field = format!("margin.{}", name);
        let raw = match sides.get(name) {
            Some(Value::String(raw)) => raw,
            Some(_) => {
                return Err(ValidationError::new(
                    field.as_str(),
                    format!("{} must be a string", field),
                ));
            }
            None => {
                return Err(ValidationError::new(
                    field.as_str(),
                    format!("{} is required", field),
                ));
            }
        };
        Length::parse(raw).ok_or_else(|| {
            ValidationError::new(
                field.as_str(),
                format!(
                    "{} must be a non-negative measurement such as 10px, 1in, 2cm or 5mm",
                    field
                ),
            )
        })
    };

    let margin = Margin {
        top: side("top")?,
        bottom: side("bottom")?,
        left: side("left")?,
        right: side("right")?,
    };

    if let Some(unknown) = sides.keys().find(|k| !MARGIN_SIDES.contains(&k.as_str())) {
        return Err(ValidationError::new(
            "margin",
            format!("margin has unknown field '{}'", unknown),
        ));
    }

    Ok(margin)
}

fn validate_scale(value: &Value) -> Result<f64, ValidationError> {
    let scale = value
        .as_f64()
        .ok_or_else(|| ValidationError::new("scale", "scale must be a number"))?;

    if (MIN_SCALE..=MAX_SCALE).contains(&scale) {
        Ok(scale)
    } else {
        Err(ValidationError::new(
            "scale",
            format!("scale must be between {} and {}", MIN_SCALE, MAX_SCALE),
        ))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_of(value: Value) -> String {
        validate_request(&value).unwrap_err().field().to_string()
    }

    fn valid() -> Value {
        json!({"url": "https://example.com", "file_name": "out.pdf"})
    }

    fn with(key: &str, value: Value) -> Value {
        let mut body = valid();
        body[key] = value;
        body
    }

    #[test]
    fn test_minimal_request() {
        let request = validate_request(&valid()).unwrap();
        assert_eq!(request.url.as_str(), "https://example.com/");
        assert_eq!(request.file_name, "out.pdf");
        assert!(request.media.is_none());
        assert!(request.format.is_none());
        assert!(request.background.is_none());
        assert!(request.layout.is_none());
        assert!(request.margin.is_none());
        assert!(request.scale.is_none());
    }

    #[test]
    fn test_full_request() {
        let request = validate_request(&json!({
            "url": "http://example.com/report?id=3",
            "file_name": "report-2024_v1.pdf",
            "media": "screen",
            "format": "letter",
            "background": false,
            "layout": "landscape",
            "margin": {"top": "1in", "bottom": "2cm", "left": "10mm", "right": "12"},
            "scale": 0.75
        }))
        .unwrap();

        assert_eq!(request.media, Some(Media::Screen));
        assert_eq!(request.format, Some(PaperFormat::Letter));
        assert_eq!(request.background, Some(false));
        assert_eq!(request.layout, Some(Layout::Landscape));
        assert_eq!(request.scale, Some(0.75));
        let margin = request.margin.unwrap();
        assert_eq!(margin.top.inches(), 1.0);
        assert_eq!(margin.right.as_str(), "12");
    }

    #[test]
    fn test_body_must_be_json_object() {
        let err = parse_request(b"{not json").unwrap_err();
        assert_eq!(err.field(), "body");

        let err = parse_request(b"[1, 2]").unwrap_err();
        assert_eq!(err.field(), "body");
        assert!(err.message().contains("object"));

        assert_eq!(parse_request(b"").unwrap_err().field(), "body");
    }

    #[test]
    fn test_missing_required_fields() {
        let err = validate_request(&json!({"file_name": "out.pdf"})).unwrap_err();
        assert_eq!(err.field(), "url");
        assert!(err.message().contains("url"));

        let err = validate_request(&json!({"url": "https://example.com"})).unwrap_err();
        assert_eq!(err.field(), "file_name");

        // Presence is checked for both before either is inspected
        assert_eq!(field_of(json!({"url": 42})), "file_name");
        assert_eq!(field_of(json!({"url": null, "file_name": "out.pdf"})), "url");
    }

    #[test]
    fn test_invalid_urls() {
        for url in [
            json!(""),
            json!("example.com"),
            json!("/relative/path"),
            json!("ftp://example.com/file"),
            json!("file:///etc/passwd"),
            json!("data:text/html,<h1>x</h1>"),
            json!("javascript:alert(1)"),
            json!(17),
        ] {
            assert_eq!(field_of(with("url", url.clone())), "url", "url {}", url);
        }
    }

    #[test]
    fn test_invalid_file_names() {
        let long = format!("{}.pdf", "a".repeat(252));
        for name in [
            json!(""),
            json!("out"),
            json!("out.PDF"),
            json!("out.pdf.exe"),
            json!(".pdf"),
            json!(".hidden.pdf"),
            json!("bad name.pdf"),
            json!("../etc/passwd.pdf"),
            json!("dir/out.pdf"),
            json!("résumé.pdf"),
            json!(long),
            json!(true),
        ] {
            let err = validate_request(&with("file_name", name.clone())).unwrap_err();
            assert_eq!(err.field(), "file_name", "file_name {}", name);
            assert!(err.message().contains("file_name"));
        }

        let max = format!("{}.pdf", "a".repeat(251));
        assert!(validate_request(&with("file_name", json!(max))).is_ok());
    }

    #[test]
    fn test_invalid_optional_fields() {
        let cases = [
            ("media", json!("tv")),
            ("media", json!("Screen")),
            ("format", json!("A7")),
            ("format", json!(4)),
            ("background", json!("true")),
            ("background", json!(1)),
            ("layout", json!("sideways")),
            ("margin", json!("1in")),
            ("scale", json!(0)),
            ("scale", json!(-1)),
            ("scale", json!("1")),
        ];

        for (key, value) in cases {
            assert_eq!(field_of(with(key, value.clone())), key, "{} = {}", key, value);
        }
    }

    #[test]
    fn test_scale_range() {
        for value in [json!(5), json!(0.05), json!(2.01)] {
            let err = validate_request(&with("scale", value.clone())).unwrap_err();
            assert_eq!(err.field(), "scale", "scale = {}", value);
            assert!(err.message().contains("between"), "{}", err.message());
        }

        for value in [json!(0.1), json!(1), json!(2.0)] {
            assert!(validate_request(&with("scale", value.clone())).is_ok(), "scale = {}", value);
        }
    }

    #[test]
    fn test_margin_rules() {
        let all = json!({"top": "1in", "bottom": "1in", "left": "1in", "right": "1in"});
        assert!(validate_request(&with("margin", all)).is_ok());

        let missing = json!({"top": "1in", "bottom": "1in", "left": "1in"});
        assert_eq!(field_of(with("margin", missing)), "margin.right");

        let bad_unit = json!({"top": "1pt", "bottom": "1in", "left": "1in", "right": "1in"});
        assert_eq!(field_of(with("margin", bad_unit)), "margin.top");

        let number = json!({"top": 10, "bottom": "1in", "left": "1in", "right": "1in"});
        assert_eq!(field_of(with("margin", number)), "margin.top");

        let extra =
            json!({"top": "1in", "bottom": "1in", "left": "1in", "right": "1in", "gutter": "1in"});
        let err = validate_request(&with("margin", extra)).unwrap_err();
        assert_eq!(err.field(), "margin");
        assert!(err.message().contains("gutter"));
    }

    #[test]
    fn test_unknown_top_level_field() {
        let err = validate_request(&with("wait", json!(5))).unwrap_err();
        assert_eq!(err.field(), "wait");
        assert!(err.message().contains("wait"));
    }

    #[test]
    fn test_null_optional_is_absent() {
        let request = validate_request(&with("scale", Value::Null)).unwrap();
        assert!(request.scale.is_none());
    }

    /// Precedence: file_name (5) is reported before scale (11), and scale
    /// before unknown fields (12).
    #[test]
    fn test_precedence() {
        let body = json!({
            "url": "https://example.com",
            "file_name": "bad name.pdf",
            "scale": -1
        });
        assert_eq!(field_of(body), "file_name");

        let body = json!({
            "url": "https://example.com",
            "file_name": "out.pdf",
            "scale": -1,
            "extra": true
        });
        assert_eq!(field_of(body), "scale");

        let body = json!({"url": "ftp://x", "file_name": "bad", "media": "tv"});
        assert_eq!(field_of(body), "url");
    }
}
