//! User-visible, non-fatal notifications
//!
//! The playback engine never lets an error escape `speak`/`stop`; it hands
//! it to a [`Notifier`] instead. A GUI would show a non-blocking alert, the
//! CLI logs it.

use crate::error::ReaderError;
use tokio::sync::mpsc;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    BackendUnavailable,
    UtteranceFailure,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&ReaderError> for Notice {
    fn from(err: &ReaderError) -> Self {
        let kind = match err {
            ReaderError::BackendUnavailable(_) => NoticeKind::BackendUnavailable,
            ReaderError::Utterance(_) => NoticeKind::UtteranceFailure,
            _ => NoticeKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Sink for errors the user should see
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn notify(&self, err: &ReaderError);
}

/// Reports through the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, err: &ReaderError) {
        error!("❌ {}", err);
    }
}

/// Forwards notices to a channel drained on the UI's own context
#[derive(Debug)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, err: &ReaderError) {
        if self.sender.send(Notice::from(err)).is_err() {
            // Nobody is listening any more; fall back to the log
            error!("❌ {}", err);
        }
    }
}
