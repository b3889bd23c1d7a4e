//! Per-conversion context.

use std::sync::Arc;

use crate::log;

/// Settings that every stage of one conversion can see, passed down explicitly.
///
/// Clones share the same settings.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    log_enabled: bool,
}

impl Default for Session {
    /// Logs if the `SVG2PNG_LOG` environment variable is set right now.
    fn default() -> Self {
        Session::new_with_logging(log::log_enabled())
    }
}

impl Session {
    /// Never logs, so that test output stays readable.
    pub fn new_for_test_suite() -> Self {
        Session::new_with_logging(false)
    }

    /// Ignores the environment and logs only if `log_enabled` is true.
    pub fn new_with_logging(log_enabled: bool) -> Self {
        Session {
            inner: Arc::new(SessionInner { log_enabled }),
        }
    }

    pub fn log_enabled(&self) -> bool {
        self.inner.log_enabled
    }
}
