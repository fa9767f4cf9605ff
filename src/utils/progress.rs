//! Progress reporting for long scans.
//!
//! A sink receives human-readable status lines. Delivery is best-effort: a
//! sink that drops messages (closed channel) never affects the scan.

use tokio::sync::mpsc::UnboundedSender;

/// Terminal message preceding a successful return
pub const FOUND_MESSAGE: &str = "Found!";

/// Prefix of the terminal message preceding a failure
pub const ERROR_PREFIX: &str = "Error: ";

pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

impl ProgressSink for UnboundedSender<String> {
    fn report(&self, message: &str) {
        let _ = self.send(message.to_string());
    }
}

/// Optional sink handed through a scan
#[derive(Clone, Copy)]
pub struct Progress<'a>(Option<&'a dyn ProgressSink>);

impl<'a> Progress<'a> {
    pub fn new(sink: Option<&'a dyn ProgressSink>) -> Self {
        Self(sink)
    }

    pub fn silent() -> Self {
        Self(None)
    }

    pub fn emit(&self, message: impl AsRef<str>) {
        if let Some(sink) = self.0 {
            sink.report(message.as_ref());
        }
    }

    pub fn found(&self) {
        self.emit(FOUND_MESSAGE);
    }

    pub fn error(&self, message: &str) {
        self.emit(format!("{}{}", ERROR_PREFIX, message));
    }
}
