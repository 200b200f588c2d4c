//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use url2pdf_api::factory::mock::MockBrowserFactory;
use url2pdf_api::storage::memory::MemoryArtifactStore;
use url2pdf_api::{PrintService, PrintServiceConfig, PrintServiceConfigBuilder};

/// Configuration with short bounds so failing tests fail fast.
pub fn test_config() -> PrintServiceConfig {
    PrintServiceConfigBuilder::new()
        .bucket("test-bucket")
        .launch_timeout(Duration::from_secs(2))
        .load_timeout(Duration::from_secs(2))
        .request_deadline(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// A service over `factory` that publishes into a fresh in-memory store.
pub fn service_with(
    factory: &MockBrowserFactory,
    config: &PrintServiceConfig,
) -> (PrintService, Arc<MemoryArtifactStore>) {
    let store = Arc::new(MemoryArtifactStore::new());
    let service = PrintService::from_config(config, Box::new(factory.clone()), store.clone())
        .unwrap();
    (service, store)
}

pub fn body(url: &str, file_name: &str) -> Vec<u8> {
    serde_json::json!({ "url": url, "file_name": file_name })
        .to_string()
        .into_bytes()
}

/// Initialize logging once; ignore repeat calls.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
