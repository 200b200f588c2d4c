//! Page rendering.
//!
//! [`render_page`] drives one checked-out page through media emulation,
//! navigation and PDF capture. It owns the [`PageHandle`] and releases it
//! before returning, whatever the outcome.
//!
//! ```text
//! render_page(page, url, options, load_timeout)
//! │
//! ├── media = screen? ──→ emulate_media(screen)
//! ├── navigate(url) ────→ bounded by load_timeout ──→ NavigationTimeout
//! │        └── status >= 400 ──→ Navigation
//! ├── scale outside 0.1..=2.0 ──→ PdfCapture
//! ├── print_to_pdf(options)
//! │        └── empty output ──→ PdfCapture
//! └── drop(page) ──→ page closed
//! ```

use std::time::{Duration, Instant};

use url::Url;

use super::types::{Media, PdfArtifact, PrintError, RenderOptions};
use super::validate::{MAX_SCALE, MIN_SCALE};
use crate::handle::PageHandle;

/// Render `url` on `page` and capture it as PDF.
///
/// # Errors
///
/// | Error | Cause |
/// |-------|-------|
/// | [`PrintError::NavigationTimeout`] | page did not load within `load_timeout` |
/// | [`PrintError::Navigation`] | DNS/TLS/connection failure, or HTTP status >= 400 |
/// | [`PrintError::PdfCapture`] | scale outside Chrome's range, capture failed or produced no bytes |
pub async fn render_page(
    page: PageHandle,
    url: &Url,
    options: &RenderOptions,
    load_timeout: Duration,
) -> Result<PdfArtifact, PrintError> {
    let start = Instant::now();
    let result = render_on(&page, url, options, load_timeout).await;
    drop(page);

    match &result {
        Ok(artifact) => log::debug!(
            "Rendered {} in {:?} ({} bytes)",
            truncate_url(url.as_str(), 100),
            start.elapsed(),
            artifact.len()
        ),
        Err(e) => log::debug!(
            "Rendering {} failed after {:?}: {}",
            truncate_url(url.as_str(), 100),
            start.elapsed(),
            e
        ),
    }

    result
}

async fn render_on(
    page: &PageHandle,
    url: &Url,
    options: &RenderOptions,
    load_timeout: Duration,
) -> Result<PdfArtifact, PrintError> {
    if !(MIN_SCALE..=MAX_SCALE).contains(&options.scale) {
        return Err(PrintError::PdfCapture(format!(
            "scale {} outside {}-{}",
            options.scale, MIN_SCALE, MAX_SCALE
        )));
    }

    if options.media == Media::Screen {
        log::trace!("Emulating screen media");
        page.emulate_media(Media::Screen).await?;
    }

    log::trace!("Navigating to {}", truncate_url(url.as_str(), 100));
    let outcome = tokio::time::timeout(load_timeout, page.navigate(url.as_str()))
        .await
        .map_err(|_| {
            PrintError::NavigationTimeout(format!(
                "{} did not finish loading within {}s",
                truncate_url(url.as_str(), 100),
                load_timeout.as_secs_f32()
            ))
        })??;

    if let Some(status) = outcome.status.filter(|_| outcome.is_error_status()) {
        return Err(PrintError::Navigation(format!(
            "{} answered HTTP {}",
            truncate_url(&outcome.final_url, 100),
            status
        )));
    }

    let bytes = page.print_to_pdf(options).await?;
    if bytes.is_empty() {
        return Err(PrintError::PdfCapture(
            "browser returned an empty document".to_string(),
        ));
    }

    Ok(PdfArtifact::new(bytes))
}

/// Truncate a URL for logging purposes.
fn truncate_url(url: &str, max_len: usize) -> String {
    if url.len() <= max_len {
        return url.to_string();
    }

    let mut end = max_len;
    while !url.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &url[..end])
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionManager;
    use crate::factory::mock::MockBrowserFactory;
    use crate::service::Layout;

    async fn page_from(factory: &MockBrowserFactory) -> (SessionManager, PageHandle) {
        let sessions = SessionManager::builder()
            .factory(Box::new(factory.clone()))
            .build()
            .unwrap();
        let page = sessions.acquire_page().await.unwrap();
        (sessions, page)
    }

    fn url() -> Url {
        Url::parse("https://example.com/report").unwrap()
    }

    #[tokio::test]
    async fn test_renders_and_releases_page() {
        let factory = MockBrowserFactory::new();
        let (sessions, page) = page_from(&factory).await;

        let artifact = render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(artifact.as_bytes().starts_with(b"%PDF"));
        assert_eq!(artifact.content_type(), "application/pdf");
        assert_eq!(sessions.stats().open_pages, 0);
        assert_eq!(factory.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_screen_media_is_emulated() {
        let factory = MockBrowserFactory::new();
        let (_sessions, page) = page_from(&factory).await;
        let options = RenderOptions {
            media: Media::Screen,
            ..Default::default()
        };

        render_page(page, &url(), &options, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(factory.last_media(), Some(Media::Screen));
    }

    #[tokio::test]
    async fn test_print_media_is_not_emulated() {
        let factory = MockBrowserFactory::new();
        let (_sessions, page) = page_from(&factory).await;

        render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(factory.last_media(), None);
    }

    #[tokio::test]
    async fn test_options_reach_the_browser() {
        let factory = MockBrowserFactory::new();
        let (_sessions, page) = page_from(&factory).await;
        let options = RenderOptions {
            layout: Layout::Landscape,
            background: false,
            ..Default::default()
        };

        render_page(page, &url(), &options, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(factory.last_print_options(), Some(options));
    }

    #[tokio::test]
    async fn test_navigation_timeout() {
        let factory = MockBrowserFactory::new().with_navigation_delay(Duration::from_secs(5));
        let (sessions, page) = page_from(&factory).await;

        let err = render_page(page, &url(), &RenderOptions::default(), Duration::from_millis(20))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintError::NavigationTimeout(_)), "{:?}", err);
        assert_eq!(sessions.stats().open_pages, 0);
    }

    #[tokio::test]
    async fn test_navigation_error() {
        let factory = MockBrowserFactory::new().with_navigation_error("net::ERR_NAME_NOT_RESOLVED");
        let (sessions, page) = page_from(&factory).await;

        let err = render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintError::Navigation(ref m) if m.contains("ERR_NAME_NOT_RESOLVED")));
        assert_eq!(sessions.stats().open_pages, 0);
    }

    #[tokio::test]
    async fn test_error_status_aborts() {
        let factory = MockBrowserFactory::new().with_status(404);
        let (_sessions, page) = page_from(&factory).await;

        let err = render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintError::Navigation(ref m) if m.contains("404")));
        assert!(factory.last_print_options().is_none(), "no capture after error status");
    }

    #[tokio::test]
    async fn test_redirect_status_is_not_an_error() {
        let factory = MockBrowserFactory::new().with_status(304);
        let (_sessions, page) = page_from(&factory).await;

        assert!(
            render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_capture_failures() {
        let factory = MockBrowserFactory::new().with_capture_error("Printing failed");
        let (_sessions, page) = page_from(&factory).await;
        let err = render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::PdfCapture(_)));

        let factory = MockBrowserFactory::new().with_empty_pdf();
        let (_sessions, page) = page_from(&factory).await;
        let err = render_page(page, &url(), &RenderOptions::default(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::PdfCapture(ref m) if m.contains("empty")));
    }

    #[tokio::test]
    async fn test_out_of_range_scale_is_not_captured() {
        let factory = MockBrowserFactory::new();
        let (sessions, page) = page_from(&factory).await;
        let options = RenderOptions {
            scale: 5.0,
            ..Default::default()
        };

        let err = render_page(page, &url(), &options, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintError::PdfCapture(ref m) if m.contains("scale")), "{:?}", err);
        assert!(factory.last_print_options().is_none(), "no capture with a 5x scale");
        assert_eq!(sessions.stats().open_pages, 0);
    }

    #[test]
    fn test_truncate_url() {
        assert_eq!(truncate_url("https://example.com", 100), "https://example.com");
        assert_eq!(truncate_url("https://example.com", 8), "https://...");
        assert_eq!(truncate_url("ééé", 3), "é...");
    }
}
