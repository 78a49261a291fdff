use tracing::error;

/// Where user-facing error messages go.
pub trait AlertSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Default sink: alerts end up in the log.
#[derive(Clone, Copy, Default)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn error(&self, message: &str) {
        error!(alert = message, "alert");
    }
}
