//! Configuration for the print service.
//!
//! This module provides [`PrintServiceConfig`] and its validating builder
//! [`PrintServiceConfigBuilder`]. With the `env-config` feature enabled the
//! [`env`] submodule reads the same settings from environment variables
//! (and an optional `app.env` file).
//!
//! # Example
//!
//! ```rust
//! use url2pdf_api::PrintServiceConfigBuilder;
//! use std::time::Duration;
//!
//! let config = PrintServiceConfigBuilder::new()
//!     .bucket("rendered-pdfs")
//!     .load_timeout(Duration::from_secs(20))
//!     .request_deadline(Duration::from_secs(45))
//!     .build()
//!     .expect("Invalid configuration");
//!
//! assert_eq!(config.bucket.as_deref(), Some("rendered-pdfs"));
//! ```

use std::time::Duration;

/// Print service configuration.
///
/// Use [`PrintServiceConfigBuilder`] for validated construction.
#[derive(Debug, Clone)]
pub struct PrintServiceConfig {
    /// Object storage bucket receiving rendered artifacts.
    ///
    /// Required by the S3 store; in-memory stores ignore it.
    pub bucket: Option<String>,

    /// Base URL under which stored objects are publicly readable.
    ///
    /// When `None`, the store derives it from the bucket (and region).
    pub public_base_url: Option<String>,

    /// Prefix prepended to every storage key (without slashes at the ends).
    pub key_prefix: String,

    /// Namespace every key with a fresh unique token.
    ///
    /// When `false`, requests with the same `file_name` overwrite each other.
    ///
    /// Default: `true`
    pub unique_keys: bool,

    /// Origins allowed to read responses (`*` for any).
    pub allowed_origins: Vec<String>,

    /// Upper bound for launching the headless browser.
    ///
    /// Default: 30 seconds
    pub launch_timeout: Duration,

    /// Upper bound for the target page to reach its load-complete state.
    ///
    /// Default: 30 seconds
    pub load_timeout: Duration,

    /// Overall wall-clock budget of one print request.
    ///
    /// Default: 60 seconds
    pub request_deadline: Duration,

    /// Launch the browser at startup instead of on the first request.
    ///
    /// Default: `false`
    pub warmup: bool,

    /// Socket address the HTTP server binds to.
    ///
    /// Default: `0.0.0.0:3000`
    pub bind_address: String,
}

impl Default for PrintServiceConfig {
    /// Production-ready defaults.
    ///
    /// | Setting | Default |
    /// |---------|---------|
    /// | `unique_keys` | true |
    /// | `allowed_origins` | `*` |
    /// | `launch_timeout` | 30s |
    /// | `load_timeout` | 30s |
    /// | `request_deadline` | 60s |
    /// | `warmup` | false |
    /// | `bind_address` | `0.0.0.0:3000` |
    fn default() -> Self {
        Self {
            bucket: None,
            public_base_url: None,
            key_prefix: String::new(),
            unique_keys: true,
            allowed_origins: vec!["*".to_string()],
            launch_timeout: Duration::from_secs(30),
            load_timeout: Duration::from_secs(30),
            request_deadline: Duration::from_secs(60),
            warmup: false,
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Builder for [`PrintServiceConfig`] with validation.
///
/// # Example
///
/// ```rust
/// use url2pdf_api::PrintServiceConfigBuilder;
/// use std::time::Duration;
///
/// let config = PrintServiceConfigBuilder::new()
///     .launch_timeout(Duration::from_secs(10))
///     .key_prefix("prints")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.key_prefix, "prints");
/// ```
pub struct PrintServiceConfigBuilder {
    config: PrintServiceConfig,
}

impl PrintServiceConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: PrintServiceConfig::default(),
        }
    }

    /// Set the storage bucket.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.bucket = Some(bucket.into());
        self
    }

    /// Set the public base URL for stored objects.
    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(url.into());
        self
    }

    /// Set the storage key prefix. Leading and trailing slashes are dropped.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Enable or disable unique key namespacing.
    pub fn unique_keys(mut self, unique: bool) -> Self {
        self.config.unique_keys = unique;
        self
    }

    /// Set the allowed origins.
    pub fn allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Set the browser launch timeout.
    pub fn launch_timeout(mut self, timeout: Duration) -> Self {
        self.config.launch_timeout = timeout;
        self
    }

    /// Set the page load timeout.
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.config.load_timeout = timeout;
        self
    }

    /// Set the overall request deadline.
    pub fn request_deadline(mut self, deadline: Duration) -> Self {
        self.config.request_deadline = deadline;
        self
    }

    /// Launch the browser eagerly at startup.
    pub fn warmup(mut self, warmup: bool) -> Self {
        self.config.warmup = warmup;
        self
    }

    /// Set the HTTP bind address.
    pub fn bind_address(mut self, address: impl Into<String>) -> Self {
        self.config.bind_address = address.into();
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - Any timeout is zero
    /// - `load_timeout` exceeds `request_deadline`
    pub fn build(self) -> std::result::Result<PrintServiceConfig, String> {
        if self.config.launch_timeout.is_zero() {
            return Err("launch_timeout must be greater than 0".to_string());
        }

        if self.config.load_timeout.is_zero() {
            return Err("load_timeout must be greater than 0".to_string());
        }

        if self.config.request_deadline.is_zero() {
            return Err("request_deadline must be greater than 0".to_string());
        }

        // The load wait nests inside the request deadline
        if self.config.load_timeout > self.config.request_deadline {
            return Err("load_timeout cannot exceed request_deadline".to_string());
        }

        Ok(self.config)
    }
}

impl Default for PrintServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Environment Configuration (feature-gated)
// ============================================================================

/// Environment-based configuration loading.
///
/// | Variable | Type | Default |
/// |----------|------|---------|
/// | `PRINT_BUCKET` | String | none |
/// | `PRINT_PUBLIC_BASE_URL` | String | derived |
/// | `PRINT_KEY_PREFIX` | String | empty |
/// | `PRINT_UNIQUE_KEYS` | bool | true |
/// | `ALLOWED_ORIGINS` | comma list | `*` |
/// | `BROWSER_LAUNCH_TIMEOUT_SECONDS` | u64 | 30 |
/// | `PAGE_LOAD_TIMEOUT_SECONDS` | u64 | 30 |
/// | `REQUEST_DEADLINE_SECONDS` | u64 | 60 |
/// | `BROWSER_WARMUP` | bool | false |
/// | `BIND_ADDRESS` | String | `0.0.0.0:3000` |
/// | `CHROME_PATH` | String | auto-detect |
#[cfg(feature = "env-config")]
pub mod env {
    use super::*;
    use crate::error::SessionError;

    /// Default environment file name.
    ///
    /// `app.env` is used instead of `.env` so the file is visible in
    /// directory listings on every platform.
    pub const ENV_FILE_NAME: &str = "app.env";

    /// Load `app.env` into the process environment if it exists.
    pub fn load_env_file() -> std::result::Result<std::path::PathBuf, dotenvy::Error> {
        dotenvy::from_filename(ENV_FILE_NAME)
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Configuration`] if the resulting values fail
    /// builder validation.
    pub fn from_env() -> std::result::Result<PrintServiceConfig, SessionError> {
        match load_env_file() {
            Ok(path) => {
                log::info!("Loaded configuration from: {:?}", path);
            }
            Err(e) => {
                log::debug!(
                    "No {} file found or failed to load: {} (using environment variables and defaults)",
                    ENV_FILE_NAME,
                    e
                );
            }
        }

        let launch_timeout_seconds = parse_var("BROWSER_LAUNCH_TIMEOUT_SECONDS").unwrap_or(30u64);
        let load_timeout_seconds = parse_var("PAGE_LOAD_TIMEOUT_SECONDS").unwrap_or(30u64);
        let deadline_seconds = parse_var("REQUEST_DEADLINE_SECONDS").unwrap_or(60u64);
        let unique_keys = parse_var("PRINT_UNIQUE_KEYS").unwrap_or(true);
        let warmup = parse_var("BROWSER_WARMUP").unwrap_or(false);

        let mut builder = PrintServiceConfigBuilder::new()
            .unique_keys(unique_keys)
            .launch_timeout(Duration::from_secs(launch_timeout_seconds))
            .load_timeout(Duration::from_secs(load_timeout_seconds))
            .request_deadline(Duration::from_secs(deadline_seconds))
            .warmup(warmup);

        if let Some(bucket) = non_empty_var("PRINT_BUCKET") {
            builder = builder.bucket(bucket);
        }
        if let Some(base) = non_empty_var("PRINT_PUBLIC_BASE_URL") {
            builder = builder.public_base_url(base);
        }
        if let Some(prefix) = non_empty_var("PRINT_KEY_PREFIX") {
            builder = builder.key_prefix(prefix);
        }
        if let Some(origins) = non_empty_var("ALLOWED_ORIGINS") {
            builder = builder.allowed_origins(parse_origins(&origins));
        }
        if let Some(address) = non_empty_var("BIND_ADDRESS") {
            builder = builder.bind_address(address);
        }

        let config = builder.build().map_err(SessionError::Configuration)?;

        log::info!("Loading print service configuration from environment:");
        log::info!(
            "   - Bucket: {}",
            config.bucket.as_deref().unwrap_or("(not set)")
        );
        log::info!("   - Key prefix: {:?}", config.key_prefix);
        log::info!("   - Unique keys: {}", config.unique_keys);
        log::info!("   - Allowed origins: {}", config.allowed_origins.join(","));
        log::info!("   - Launch timeout: {}s", config.launch_timeout.as_secs());
        log::info!("   - Load timeout: {}s", config.load_timeout.as_secs());
        log::info!("   - Request deadline: {}s", config.request_deadline.as_secs());

        Ok(config)
    }

    /// Read the optional custom Chrome binary path.
    pub fn chrome_path_from_env() -> Option<String> {
        non_empty_var("CHROME_PATH")
    }

    fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
    }

    fn non_empty_var(name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn parse_origins(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_origins() {
            assert_eq!(
                parse_origins("https://a.example, https://b.example ,"),
                vec!["https://a.example", "https://b.example"]
            );
            assert_eq!(parse_origins("*"), vec!["*"]);
            assert!(parse_origins(" , ").is_empty());
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
