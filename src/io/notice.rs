//! Typed channel for user-visible transient notices
//!
//! Every recoverable failure in the core is translated into a notice at the
//! boundary where it occurs and never re-thrown upward. The display layer
//! consumes the receiver; the core only ever sends.

use tokio::sync::mpsc;
use tracing::debug;

/// How the display layer should style a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Warning,
}

/// A transient, user-visible message
#[derive(Debug, Clone)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { severity: NoticeSeverity::Info, title: title.into(), detail: detail.into() }
    }

    pub fn warning(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { severity: NoticeSeverity::Warning, title: title.into(), detail: detail.into() }
    }
}

/// Sender half handed to the core services
#[derive(Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    /// Send a notice; a closed receiver is harmless (display layer gone)
    pub fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            debug!("notice_receiver_closed");
        }
    }
}

/// Create the notice channel; the receiver belongs to the display layer
pub fn create_notice_channel() -> (NoticeSender, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NoticeSender { tx }, rx)
}
