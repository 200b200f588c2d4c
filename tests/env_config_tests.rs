//! Environment configuration tests.
//!
//! Kept in their own test binary: `set_var` is unsound while other threads
//! read the environment, and nothing else runs in this process.

#![cfg(feature = "env-config")]

use std::time::Duration;

use url2pdf_api::config::env::from_env;

#[test]
fn test_from_env() {
    // SAFETY: this is the only test in the binary, so no other thread reads
    // or writes the environment while it runs.
    unsafe {
        std::env::set_var("PRINT_BUCKET", " rendered-pdfs ");
        std::env::set_var("PRINT_KEY_PREFIX", "reports");
        std::env::set_var("PRINT_UNIQUE_KEYS", "false");
        std::env::set_var("ALLOWED_ORIGINS", "https://a.example,https://b.example");
        std::env::set_var("PAGE_LOAD_TIMEOUT_SECONDS", "not-a-number");
        std::env::set_var("REQUEST_DEADLINE_SECONDS", "90");
    }

    let config = from_env().unwrap();

    assert_eq!(config.bucket.as_deref(), Some("rendered-pdfs"));
    assert_eq!(config.key_prefix, "reports");
    assert!(!config.unique_keys);
    assert_eq!(
        config.allowed_origins,
        vec!["https://a.example", "https://b.example"]
    );
    assert_eq!(config.load_timeout, Duration::from_secs(30));
    assert_eq!(config.request_deadline, Duration::from_secs(90));
}
