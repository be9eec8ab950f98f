//! TTS (Text-to-Speech) Backend Module
//!
//! The playback engine drives speech through the [`SpeechBackend`] trait.
//! Backends speak one utterance at a time and hand back an [`Utterance`]
//! that resolves when the audio is done (or was killed).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::info;

pub mod spd_say;

/// A voice as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Unique key, passed back to [`SpeechBackend::set_voice`]
    pub name: String,
    /// Locale tag such as `en-US`; may be empty
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl Voice {
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
            variant: None,
        }
    }
}

/// Completion handle for a single utterance
#[derive(Debug)]
pub struct Utterance {
    done: oneshot::Receiver<()>,
}

/// The backend side of an [`Utterance`]. Dropping it also completes the utterance.
#[derive(Debug)]
pub struct UtteranceDone(oneshot::Sender<()>);

impl Utterance {
    /// An utterance that completes when the returned [`UtteranceDone`] fires or drops
    pub fn pending() -> (UtteranceDone, Self) {
        let (tx, rx) = oneshot::channel();
        (UtteranceDone(tx), Self { done: rx })
    }

    /// An utterance that has already completed
    pub fn finished() -> Self {
        let (done, utterance) = Self::pending();
        done.complete();
        utterance
    }

    /// Wait until the backend reports the utterance as done
    pub async fn wait(self) {
        let _ = self.done.await;
    }
}

impl UtteranceDone {
    pub fn complete(self) {
        let _ = self.0.send(());
    }
}

/// Trait for speech backends
///
/// Everything except waiting on an [`Utterance`] is synchronous, so the
/// engine can submit and stop while holding its session lock.
pub trait SpeechBackend: Send + Sync + std::fmt::Debug {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Set the speaking rate (-100 very slow, +100 very fast)
    fn set_rate(&self, rate: i32);

    /// Select a voice by its name
    fn set_voice(&self, name: &str);

    /// All voices the backend offers, in backend order
    fn list_voices(&self) -> Vec<Voice>;

    /// Start speaking `text`
    fn say(&self, text: &str) -> Result<Utterance>;

    /// Halt audio immediately
    fn stop_talking(&self);
}

/// Connect to the system speech backend
pub async fn create_backend() -> Result<Arc<dyn SpeechBackend>> {
    info!("🛠️ Creating speech backend");
    let backend: Arc<dyn SpeechBackend> = Arc::new(spd_say::SpdSayBackend::connect().await?);
    info!(
        "✅ Speech backend '{}' initialized with {} voices",
        backend.name(),
        backend.list_voices().len()
    );
    Ok(backend)
}
