//! Playback engine
//!
//! Owns the single playback session. A `speak*` call stops whatever is
//! playing, configures the backend, and spawns a driver task that submits
//! one fragment at a time, waiting for each utterance to finish before
//! the next. Every step of the driver, `stop`, and natural completion go
//! through the session slot lock and check the session's generation, so a
//! completion that arrives after `stop` cannot bring a session back.

use super::catalog::{CollapsePolicy, VoiceCatalog};
use super::segmenter::{segment, Fragment};
use super::speed::SpeedProfile;
use super::utterance::{prepare_fragment, prepare_whole};
use crate::config::Settings;
use crate::error::ReaderError;
use crate::notify::Notifier;
use crate::tts::{self, SpeechBackend, Voice};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Byte range of the source text that is about to be spoken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub start: usize,
    pub end: usize,
}

/// Progress events of one session, drained on the caller's own context.
///
/// Once the session is stopped (explicitly or by a newer `speak*` call)
/// the receiver yields nothing more, not even events already queued.
#[derive(Debug)]
pub struct ProgressReceiver {
    events: mpsc::UnboundedReceiver<Progress>,
    cancel: CancellationToken,
}

impl ProgressReceiver {
    fn new(events: mpsc::UnboundedReceiver<Progress>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// A receiver that never yields
    fn closed() -> Self {
        let (_, events) = mpsc::unbounded_channel();
        Self::new(events, CancellationToken::new())
    }

    /// Next event, or `None` when the session is over
    pub async fn recv(&mut self) -> Option<Progress> {
        let event = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        };
        event.filter(|_| !self.cancel.is_cancelled())
    }

    /// Next event if one is queued
    pub fn try_recv(&mut self) -> Option<Progress> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.events.try_recv().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking { fragment: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Fragment by fragment, with progress
    Parts,
    /// The whole text as one utterance
    Whole,
}

/// One speak call, owned by its driver task
#[derive(Debug)]
struct PlaybackSession {
    generation: u64,
    text: String,
    fragments: Vec<Fragment>,
    voice: Voice,
    speed: SpeedProfile,
    mode: Mode,
    progress: mpsc::UnboundedSender<Progress>,
    cancel: CancellationToken,
}

#[derive(Debug)]
struct ActiveSession {
    generation: u64,
    fragment: usize,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct SessionSlot {
    generation: u64,
    active: Option<ActiveSession>,
}

impl SessionSlot {
    fn current(&mut self, generation: u64) -> Option<&mut ActiveSession> {
        self.active
            .as_mut()
            .filter(|active| active.generation == generation)
    }
}

#[derive(Debug)]
struct EngineInner {
    backend: Option<Arc<dyn SpeechBackend>>,
    unavailable_reason: String,
    unavailable_reported: AtomicBool,
    catalog: VoiceCatalog,
    notifier: Arc<dyn Notifier>,
    slot: Mutex<SessionSlot>,
    speaking: watch::Sender<bool>,
    /// Serializes `speak*` calls
    speak_lock: tokio::sync::Mutex<()>,
}

impl EngineInner {
    fn lock_slot(&self) -> MutexGuard<'_, SessionSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.lock_slot();
        if slot.current(generation).is_some() {
            slot.active = None;
            self.speaking.send_replace(false);
            info!("✅ Playback finished (session {})", generation);
        }
    }
}

/// Handle to the playback engine; clones share the same session
#[derive(Debug, Clone)]
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
}

impl PlaybackEngine {
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        notifier: Arc<dyn Notifier>,
        policy: CollapsePolicy,
    ) -> Self {
        Self::build(Some(backend), String::new(), notifier, policy)
    }

    /// An engine without a backend; every operation is a no-op
    pub fn unavailable(reason: impl Into<String>, notifier: Arc<dyn Notifier>) -> Self {
        Self::build(None, reason.into(), notifier, CollapsePolicy::default())
    }

    /// Connect to the system speech backend, degrading to an unavailable engine
    pub async fn connect(settings: &Settings, notifier: Arc<dyn Notifier>) -> Self {
        match tts::create_backend().await {
            Ok(backend) => Self::new(backend, notifier, settings.collapse.clone()),
            Err(e) => {
                warn!("⚠️ Speech backend unavailable: {:#}", e);
                Self::unavailable(
                    format!(
                        "{:#}. Make sure speech-dispatcher is installed and `spd-say` works.",
                        e
                    ),
                    notifier,
                )
            }
        }
    }

    fn build(
        backend: Option<Arc<dyn SpeechBackend>>,
        unavailable_reason: String,
        notifier: Arc<dyn Notifier>,
        policy: CollapsePolicy,
    ) -> Self {
        let (speaking, _) = watch::channel(false);
        Self {
            inner: Arc::new(EngineInner {
                catalog: VoiceCatalog::new(backend.clone(), policy),
                backend,
                unavailable_reason,
                unavailable_reported: AtomicBool::new(false),
                notifier,
                slot: Mutex::new(SessionSlot::default()),
                speaking,
                speak_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.inner.catalog
    }

    pub fn is_available(&self) -> bool {
        self.inner.backend.is_some()
    }

    /// Observable speaking flag, for binding button state
    pub fn speaking(&self) -> watch::Receiver<bool> {
        self.inner.speaking.subscribe()
    }

    pub fn is_speaking(&self) -> bool {
        *self.inner.speaking.borrow()
    }

    pub fn state(&self) -> PlaybackState {
        match &self.inner.lock_slot().active {
            Some(active) => PlaybackState::Speaking {
                fragment: active.fragment,
            },
            None => PlaybackState::Idle,
        }
    }

    /// Speak `text` fragment by fragment.
    ///
    /// The returned receiver yields the byte range of each fragment, in
    /// order, right before it is spoken. Returns once playback has started.
    pub async fn speak_in_parts(
        &self,
        text: &str,
        voice: Option<&str>,
        speed: &SpeedProfile,
    ) -> ProgressReceiver {
        self.start(text, voice, speed, Mode::Parts).await
    }

    /// Speak `text` as a single utterance, without progress
    pub async fn speak(&self, text: &str, voice: Option<&str>, speed: &SpeedProfile) {
        self.start(text, voice, speed, Mode::Whole).await;
    }

    /// Halt playback. A no-op when nothing is playing.
    pub fn stop(&self) {
        let Some(backend) = self.backend() else {
            return;
        };
        let mut slot = self.inner.lock_slot();
        if let Some(active) = slot.active.take() {
            active.cancel.cancel();
            backend.stop_talking();
            self.inner.speaking.send_replace(false);
            info!("🛑 Playback stopped (session {})", active.generation);
        }
    }

    /// Select the voice for later utterances; unknown names fall back silently
    pub fn set_voice(&self, name: Option<&str>) -> Option<Voice> {
        self.backend()?;
        Some(self.inner.catalog.set_active(name))
    }

    /// The backend, or `None` after reporting that it is missing
    fn backend(&self) -> Option<Arc<dyn SpeechBackend>> {
        if let Some(backend) = &self.inner.backend {
            return Some(backend.clone());
        }
        if self.inner.unavailable_reported.swap(true, Ordering::SeqCst) {
            debug!("Speech backend unavailable, ignoring request");
        } else {
            self.inner.notifier.notify(&ReaderError::BackendUnavailable(
                self.inner.unavailable_reason.clone(),
            ));
        }
        None
    }

    async fn start(
        &self,
        text: &str,
        voice: Option<&str>,
        speed: &SpeedProfile,
        mode: Mode,
    ) -> ProgressReceiver {
        let Some(backend) = self.backend() else {
            return ProgressReceiver::closed();
        };
        let _guard = self.inner.speak_lock.lock().await;
        self.stop();

        backend.set_rate(speed.rate);
        let voice = self.inner.catalog.set_active(voice);
        let fragments = match mode {
            Mode::Parts => segment(text),
            Mode::Whole => vec![Fragment {
                start: 0,
                end: text.len(),
            }],
        };

        let (progress, events) = mpsc::unbounded_channel();
        let session = {
            let mut slot = self.inner.lock_slot();
            slot.generation += 1;
            let cancel = CancellationToken::new();
            slot.active = Some(ActiveSession {
                generation: slot.generation,
                fragment: 0,
                cancel: cancel.clone(),
            });
            self.inner.speaking.send_replace(true);
            PlaybackSession {
                generation: slot.generation,
                text: text.to_string(),
                fragments,
                voice,
                speed: *speed,
                mode,
                progress,
                cancel,
            }
        };

        info!(
            "📢 Session {} speaking {} fragment(s) with '{}' at {}",
            session.generation,
            session.fragments.len(),
            session.voice.name,
            session.speed
        );
        let receiver = ProgressReceiver::new(events, session.cancel.clone());
        tokio::spawn(drive(self.inner.clone(), backend, session));
        receiver
    }
}

/// Submit fragments one after another until done or superseded
async fn drive(
    inner: Arc<EngineInner>,
    backend: Arc<dyn SpeechBackend>,
    session: PlaybackSession,
) {
    for (index, fragment) in session.fragments.iter().enumerate() {
        let piece = fragment.slice(&session.text);
        let prepared = match session.mode {
            Mode::Parts => prepare_fragment(piece, &session.speed),
            Mode::Whole => prepare_whole(piece, &session.speed),
        };

        let submitted = {
            let mut slot = inner.lock_slot();
            let Some(active) = slot.current(session.generation) else {
                debug!("Session {} superseded", session.generation);
                return;
            };
            active.fragment = index;
            if session.mode == Mode::Parts {
                let _ = session.progress.send(Progress {
                    start: fragment.start,
                    end: fragment.end,
                });
            }
            if prepared.trim().is_empty() {
                None
            } else {
                Some(backend.say(&prepared))
            }
        };

        match submitted {
            None => tokio::task::yield_now().await,
            Some(Ok(utterance)) => {
                debug!("Session {} fragment {} submitted", session.generation, index);
                tokio::select! {
                    _ = utterance.wait() => {}
                    _ = session.cancel.cancelled() => return,
                }
            }
            Some(Err(e)) => {
                warn!(
                    "⚠️ Session {} fragment {} failed: {:#}",
                    session.generation, index, e
                );
                inner
                    .notifier
                    .notify(&ReaderError::Utterance(format!("{:#}", e)));
            }
        }
    }
    inner.finish(session.generation);
}
