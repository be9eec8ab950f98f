//! Mock Speech Backend for Testing
//!
//! Records all spoken text for verification. Utterances either finish at
//! once or are held until the test releases them.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use tuxreader::tts::{SpeechBackend, Utterance, UtteranceDone, Voice};

#[derive(Debug, Default)]
pub struct MockBackend {
    voices: Vec<Voice>,
    /// All text that was "spoken"
    pub spoken: Mutex<Vec<String>>,
    /// Keep utterances pending until released
    pub hold: AtomicBool,
    pending: Mutex<Vec<UtteranceDone>>,
    /// Fail any utterance containing this text
    pub fail_on: Mutex<Option<String>>,
    pub rate: AtomicI32,
    pub voice: Mutex<Option<String>>,
    pub stops: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_voices(vec![
            Voice::new("English (America)", "en-US"),
            Voice::new("Deutsch", "de-DE"),
        ])
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Default::default()
        }
    }

    /// A backend whose utterances wait for [`MockBackend::complete_all`]
    pub fn holding() -> Self {
        let backend = Self::new();
        backend.hold.store(true, Ordering::SeqCst);
        backend
    }

    pub fn fail_on(&self, text: &str) {
        *self.fail_on.lock().unwrap() = Some(text.to_string());
    }

    /// Get all spoken phrases
    pub fn get_spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Finish every held utterance
    pub fn complete_all(&self) {
        for done in self.pending.lock().unwrap().drain(..) {
            done.complete();
        }
    }

    pub fn active_voice(&self) -> Option<String> {
        self.voice.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl SpeechBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn set_rate(&self, rate: i32) {
        self.rate.store(rate, Ordering::SeqCst);
    }

    fn set_voice(&self, name: &str) {
        *self.voice.lock().unwrap() = Some(name.to_string());
    }

    fn list_voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn say(&self, text: &str) -> Result<Utterance> {
        if let Some(needle) = self.fail_on.lock().unwrap().as_deref() {
            if text.contains(needle) {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "Mock TTS failure",
                )
                .into());
            }
        }
        self.spoken.lock().unwrap().push(text.to_string());
        if self.hold.load(Ordering::SeqCst) {
            let (done, utterance) = Utterance::pending();
            self.pending.lock().unwrap().push(done);
            Ok(utterance)
        } else {
            Ok(Utterance::finished())
        }
    }

    fn stop_talking(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        // Dropping the completers finishes the utterances, like a killed process
        self.pending.lock().unwrap().clear();
    }
}
