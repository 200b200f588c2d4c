//! Session statistics for monitoring and health checks.
//!
//! [`SessionStats`] is a point-in-time snapshot of the
//! [`SessionManager`](crate::SessionManager).
//!
//! ```rust,ignore
//! let stats = sessions.stats();
//! log::info!("{}", stats);
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Lifecycle phase of the shared browser session.
///
/// ```text
/// Uninitialized ──launch──→ Launching ──ok──→ Ready
///                               │               │ health check fails
///                               └──error──→ Failed ←┘
///                                              │
///                                next acquire ─┘──→ Launching
/// ```
///
/// `ShuttingDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No browser has been launched yet.
    Uninitialized,
    /// A launch is in flight.
    Launching,
    /// A healthy browser is serving pages.
    Ready,
    /// The last launch failed or the browser died; the next acquisition relaunches.
    Failed,
    /// [`shutdown`](crate::SessionManager::shutdown) was called.
    ShuttingDown,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Launching => "launching",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::ShuttingDown => "shutting_down",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of session statistics.
///
/// | Field | Description |
/// |-------|-------------|
/// | `phase` | Current [`SessionPhase`] |
/// | `open_pages` | Pages checked out and not yet released |
/// | `launches` | Successful launches since start |
/// | `launch_failures` | Failed or abandoned launches since start |
/// | `browser_age` | Age of the running browser, if `Ready` |
///
/// Values may change immediately after reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub phase: SessionPhase,

    pub open_pages: usize,

    pub launches: u64,

    pub launch_failures: u64,

    #[serde(skip)]
    pub browser_age: Option<Duration>,
}

impl SessionStats {
    /// Whether a browser is up and a request can skip the launch.
    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    /// Total relaunches (launches beyond the first).
    pub fn relaunches(&self) -> u64 {
        self.launches.saturating_sub(1)
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionStats {{ phase: {}, open_pages: {}, launches: {}, launch_failures: {} }}",
            self.phase, self.open_pages, self.launches, self.launch_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(phase: SessionPhase, launches: u64) -> SessionStats {
        SessionStats {
            phase,
            open_pages: 2,
            launches,
            launch_failures: 1,
            browser_age: None,
        }
    }

    #[test]
    fn test_is_ready() {
        assert!(stats(SessionPhase::Ready, 1).is_ready());
        assert!(!stats(SessionPhase::Failed, 1).is_ready());
        assert!(!stats(SessionPhase::Uninitialized, 0).is_ready());
    }

    #[test]
    fn test_relaunches_saturating() {
        assert_eq!(stats(SessionPhase::Ready, 3).relaunches(), 2);
        assert_eq!(stats(SessionPhase::Uninitialized, 0).relaunches(), 0);
    }

    #[test]
    fn test_display() {
        let display = stats(SessionPhase::Ready, 1).to_string();
        assert!(display.contains("phase: ready"));
        assert!(display.contains("open_pages: 2"));
        assert!(display.contains("launch_failures: 1"));
    }

    #[test]
    fn test_serialize() {
        let value = serde_json::to_value(stats(SessionPhase::ShuttingDown, 1)).unwrap();
        assert_eq!(value["phase"], "shutting_down");
        assert_eq!(value["open_pages"], 2);
        assert!(value.get("browser_age").is_none());
    }
}
