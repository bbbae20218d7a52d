//! Report delivery.
//!
//! A failed delivery never fails the run: callers go through
//! [`deliver`], which logs the error and moves on.

use std::io::Write;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(#[from] std::io::Error),

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Something that can carry a finished report to a human.
pub trait Notifier {
    fn name(&self) -> &str;

    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "== {subject} ==")?;
        writeln!(out, "{body}")?;
        out.flush()?;
        Ok(())
    }
}

/// Send through `notifier`, logging instead of failing.
///
/// Returns whether the notification went out.
pub fn deliver(notifier: &dyn Notifier, subject: &str, body: &str) -> bool {
    match notifier.notify(subject, body) {
        Ok(()) => {
            info!(notifier = notifier.name(), subject, "notification sent");
            true
        }
        Err(e) => {
            warn!(notifier = notifier.name(), subject, error = %e, "notification failed");
            false
        }
    }
}

/// Subject line for a run report: `<strategy> Report [<date>]`.
pub fn report_subject(strategy: &str, as_of: Option<chrono::NaiveDate>) -> String {
    match as_of {
        Some(date) => format!("{strategy} Report [{date}]"),
        None => format!("{strategy} Report"),
    }
}
