//! Navigation hook invoked when the client has to send the user elsewhere,
//! most importantly back to the login page after a 401.

use parking_lot::Mutex;

/// Entry point users are sent to when their session is rejected.
pub const LOGIN_PAGE: &str = "/pages/login/login.html";

/// Performs (or records) a navigation to `target`.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Logs the navigation instead of performing it. Suitable for headless
/// callers that surface the redirect through their own UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, target: &str) {
        tracing::info!(target_page = target, "redirect requested");
    }
}

/// Collects every navigation target in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.targets.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets.lock().push(target.to_string());
    }
}
