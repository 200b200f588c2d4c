//! Artifact persistence.
//!
//! [`ArtifactPublisher`] turns a rendered [`PdfArtifact`] into a
//! [`StorageLocation`]: it derives the object key, writes the bytes through
//! an [`ArtifactStore`], and builds the public URL.
//!
//! # Key Layout
//!
//! ```text
//! [<prefix>/]<uuid-v4>/<file_name>     unique_keys = true (default)
//! [<prefix>/]<file_name>               unique_keys = false
//! ```
//!
//! With unique keys two requests for the same `file_name` never overwrite
//! each other.
//!
//! # Available Stores
//!
//! | Store | Description |
//! |-------|-------------|
//! | [`S3ArtifactStore`](s3::S3ArtifactStore) | Amazon S3 (feature `s3-storage`) |
//! | [`MemoryArtifactStore`](memory::MemoryArtifactStore) | In-process map for tests (feature `test-utils`) |

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

#[cfg(feature = "s3-storage")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::service::validate::is_file_name_char;
use crate::service::{PdfArtifact, StorageLocation};

/// Write-capable handle to an object store.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any existing object.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public URL under which `key` is retrievable.
    fn public_url(&self, key: &str) -> String;
}

/// Derives keys and publishes artifacts to an [`ArtifactStore`].
#[derive(Clone)]
pub struct ArtifactPublisher {
    store: Arc<dyn ArtifactStore>,
    key_prefix: String,
    unique_keys: bool,
}

impl ArtifactPublisher {
    /// Publisher with no key prefix and unique keys.
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            key_prefix: String::new(),
            unique_keys: true,
        }
    }

    /// Prefix every key with `prefix/`. Surrounding slashes are ignored.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Set to `false` to let equal file names overwrite each other.
    pub fn with_unique_keys(mut self, unique: bool) -> Self {
        self.unique_keys = unique;
        self
    }

    /// Derive the storage key for `file_name`.
    pub fn object_key(&self, file_name: &str) -> String {
        let name = sanitize_file_name(file_name);
        let mut segments: Vec<String> = Vec::with_capacity(3);

        if !self.key_prefix.is_empty() {
            segments.push(self.key_prefix.clone());
        }
        if self.unique_keys {
            segments.push(Uuid::new_v4().to_string());
        }
        segments.push(name);

        segments.join("/")
    }

    /// Write the artifact and return where it lives.
    ///
    /// # Errors
    ///
    /// [`StorageError::Write`] if the store rejects the write. Not retried.
    pub async fn publish(
        &self,
        artifact: PdfArtifact,
        file_name: &str,
    ) -> Result<StorageLocation, StorageError> {
        let key = self.object_key(file_name);
        let content_type = artifact.content_type();
        let size = artifact.len();

        log::debug!("Writing {} bytes to {}", size, key);
        self.store
            .put_object(&key, artifact.into_bytes(), content_type)
            .await
            .inspect_err(|e| log::error!("❌ {}", e))?;

        let url = self.store.public_url(&key);
        log::info!("✅ Published {} ({} bytes)", key, size);

        Ok(StorageLocation { key, url })
    }
}

impl std::fmt::Debug for ArtifactPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactPublisher")
            .field("key_prefix", &self.key_prefix)
            .field("unique_keys", &self.unique_keys)
            .finish()
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// Validated file names pass through unchanged.
///
/// ```rust
/// use url2pdf_api::storage::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
/// assert_eq!(sanitize_file_name("my report/v2.pdf"), "my_report_v2.pdf");
/// ```
pub fn sanitize_file_name(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| if is_file_name_char(c) { c } else { '_' })
        .collect();

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

/// Join `base` and a percent-encoded `key`, keeping `/` between segments.
///
/// ```rust
/// use url2pdf_api::storage::public_object_url;
///
/// assert_eq!(
///     public_object_url("https://bucket.example/", "a b/out.pdf"),
///     "https://bucket.example/a%20b/out.pdf"
/// );
/// ```
pub fn public_object_url(base: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();

    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}

// ============================================================================
// Unit Tests
// ============================================================================
