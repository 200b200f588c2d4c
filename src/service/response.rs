//! Mapping pipeline outcomes to HTTP replies.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | stored artifact | 200 | `{"url": "..."}` |
//! | [`PrintError::Validation`] | 400 | `{"message": "<field-specific message>"}` |
//! | any other [`PrintError`] | 500 | `{"message": "render failed"}` |
//! | body rejected by the transport | 4xx | `{"message": "<transport message>"}` |
//!
//! Server-side failure details are logged, never returned to the caller.

use serde_json::{Value, json};

use super::types::{PrintError, PrintResponse, StorageLocation};

/// Message returned for every server-side failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "render failed";

/// A framework-agnostic HTTP reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintReply {
    status: u16,
    body: Value,
}

impl PrintReply {
    /// Build the reply for a finished pipeline run.
    pub fn from_result(result: Result<StorageLocation, PrintError>) -> Self {
        match result {
            Ok(location) => Self::ok(PrintResponse::from(location)),
            Err(error) => Self::from_error(&error),
        }
    }

    pub fn ok(response: PrintResponse) -> Self {
        Self {
            status: 200,
            body: json!({ "url": response.url }),
        }
    }

    pub fn from_error(error: &PrintError) -> Self {
        let message = match error {
            PrintError::Validation(validation) => {
                log::debug!("Rejected print request: {}", validation);
                validation.message().to_string()
            }
            other => {
                log::error!("❌ Print request failed [{}]: {}", other.error_code(), other);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        Self {
            status: error.status_code(),
            body: json!({ "message": message }),
        }
    }

    /// Reply for a body the HTTP layer refused before it reached the pipeline,
    /// such as one over the size limit.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        log::debug!("Rejected print request body ({}): {}", status, message);

        Self {
            status,
            body: json!({ "message": message }),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn into_parts(self) -> (u16, Value) {
        (self.status, self.body)
    }
}
