//! The print pipeline.
//!
//! [`PrintService`] wires validation, option resolution, the shared
//! browser session, rendering and publishing into one call:
//!
//! ```text
//! body ──→ parse_request ──→ RenderOptions::resolve ──→ acquire_page
//!                                                          │
//!      StorageLocation ←── publish ←── render_page ←───────┘
//! ```
//!
//! Everything after validation runs under the request deadline. When the
//! deadline fires the in-flight future is dropped, which drops the page
//! handle and closes the page.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::render::render_page;
use super::response::PrintReply;
use super::types::{PrintError, PrintRequest, RenderOptions, StorageLocation};
use super::validate::parse_request;
use crate::config::PrintServiceConfig;
use crate::error::SessionError;
use crate::factory::BrowserFactory;
use crate::session::SessionManager;
use crate::storage::{ArtifactPublisher, ArtifactStore};

/// Framework-agnostic print pipeline.
///
/// Cheap to share: wrap in an `Arc` and hand it to every request task.
pub struct PrintService {
    sessions: Arc<SessionManager>,
    publisher: ArtifactPublisher,
    load_timeout: Duration,
    request_deadline: Duration,
}

impl PrintService {
    /// Assemble a service from ready-made parts.
    pub fn new(
        sessions: Arc<SessionManager>,
        publisher: ArtifactPublisher,
        config: &PrintServiceConfig,
    ) -> Self {
        Self {
            sessions,
            publisher,
            load_timeout: config.load_timeout,
            request_deadline: config.request_deadline,
        }
    }

    /// Build the session manager and publisher from `config`.
    ///
    /// No browser is launched until the first request (or
    /// [`SessionManager::warmup`]).
    pub fn from_config(
        config: &PrintServiceConfig,
        factory: Box<dyn BrowserFactory>,
        store: Arc<dyn ArtifactStore>,
    ) -> Result<Self, SessionError> {
        let sessions = SessionManager::builder()
            .factory(factory)
            .launch_timeout(config.launch_timeout)
            .build()?
            .into_shared();

        let publisher = ArtifactPublisher::new(store)
            .with_key_prefix(config.key_prefix.clone())
            .with_unique_keys(config.unique_keys);

        Ok(Self::new(sessions, publisher, config))
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Run the pipeline on a raw request body.
    ///
    /// # Errors
    ///
    /// The first failing stage's [`PrintError`]. A request that fails
    /// validation never reaches the browser.
    pub async fn print(&self, body: &[u8]) -> Result<StorageLocation, PrintError> {
        let request = parse_request(body).inspect_err(|e| {
            log::debug!("Invalid print request ({}): {}", e.field(), e);
        })?;
        self.print_request(request).await
    }

    /// Run the pipeline on an already validated request.
    pub async fn print_request(&self, request: PrintRequest) -> Result<StorageLocation, PrintError> {
        let start = Instant::now();
        log::info!(
            "Print request: {} -> {}",
            request.url,
            request.file_name
        );

        let result = tokio::time::timeout(self.request_deadline, self.run(&request))
            .await
            .unwrap_or_else(|_| {
                log::warn!(
                    "⚠️ Request deadline of {}s exceeded for {}",
                    self.request_deadline.as_secs(),
                    request.url
                );
                Err(PrintError::DeadlineExceeded(self.request_deadline))
            });

        if let Ok(location) = &result {
            log::info!("✅ Printed {} in {:?}", location.key, start.elapsed());
        }
        result
    }

    /// Run the pipeline and map the outcome to an HTTP reply.
    pub async fn handle(&self, body: &[u8]) -> PrintReply {
        PrintReply::from_result(self.print(body).await)
    }

    async fn run(&self, request: &PrintRequest) -> Result<StorageLocation, PrintError> {
        let options = RenderOptions::resolve(request);
        log::debug!("Resolved render options: {:?}", options);

        let page = self.sessions.acquire_page().await?;
        let artifact = render_page(page, &request.url, &options, self.load_timeout).await?;

        Ok(self.publisher.publish(artifact, &request.file_name).await?)
    }
}

impl std::fmt::Debug for PrintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintService")
            .field("sessions", &self.sessions)
            .field("publisher", &self.publisher)
            .field("load_timeout", &self.load_timeout)
            .field("request_deadline", &self.request_deadline)
            .finish()
    }
}

// ============================================================================
// Environment Initialization (feature-gated)
// ============================================================================

/// Build a [`PrintService`] backed by Chrome and S3 from environment variables.
///
/// Reads configuration with [`from_env`](crate::config::env::from_env),
/// uses `CHROME_PATH` when set, and launches the browser right away when
/// `BROWSER_WARMUP` is on. A failed warmup is logged, not fatal: the next
/// request retries the launch.
///
/// # Errors
///
/// [`SessionError::Configuration`] if the configuration is invalid or
/// `PRINT_BUCKET` is not set.
#[cfg(all(feature = "env-config", feature = "s3-storage"))]
pub async fn init_print_service() -> Result<(Arc<PrintService>, PrintServiceConfig), SessionError> {
    use crate::config::env::{chrome_path_from_env, from_env};
    use crate::factory::ChromeBrowserFactory;
    use crate::storage::s3::S3ArtifactStore;

    log::info!("Initializing print service from environment...");

    let config = from_env()?;
    let bucket = config
        .bucket
        .clone()
        .ok_or_else(|| SessionError::Configuration("PRINT_BUCKET must be set".to_string()))?;

    let factory = match chrome_path_from_env() {
        Some(path) => {
            log::info!("Using custom Chrome path: {}", path);
            ChromeBrowserFactory::with_path(path)
        }
        None => {
            log::info!("Using auto-detected Chrome browser");
            ChromeBrowserFactory::with_defaults()
        }
    }
    .with_page_timeout(config.load_timeout);

    let store = S3ArtifactStore::from_env(bucket, config.public_base_url.clone()).await;
    let service = PrintService::from_config(&config, Box::new(factory), Arc::new(store))
        .inspect_err(|e| log::error!("❌ Failed to create print service: {}", e))?;

    if config.warmup {
        if let Err(e) = service.sessions().warmup().await {
            log::warn!("⚠️ Warmup failed, first request will relaunch: {}", e);
        }
    }

    log::info!("✅ Print service ready");
    Ok((Arc::new(service), config))
}
