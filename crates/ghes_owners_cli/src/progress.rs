//! Progress reporting for report runs.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): spinners and an organization bar using indicatif
//! - Logging mode (non-TTY): structured logging using tracing

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use ghes_owners::{ProgressCallback, ReportProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter for `host`, auto-detecting TTY mode.
    pub fn new(host: &str) -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new(host))
        } else {
            Self::Logging(LoggingReporter::new(host))
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: ReportProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| {
            reporter.handle(event);
        })
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

/// Browser URL of an organization on the instance.
pub(crate) fn organization_url(host: &str, organization: &str) -> String {
    format!("https://{host}/{organization}")
}
