//! Speech playback
//!
//! Speed presets, text segmentation, the voice catalog, and the engine
//! that plays text through a [`crate::tts::SpeechBackend`].

pub mod catalog;
pub mod engine;
pub mod segmenter;
pub mod speed;
pub mod utterance;

pub use catalog::{CollapsePolicy, VariantFilter, VoiceCatalog};
pub use engine::{PlaybackEngine, PlaybackState, Progress, ProgressReceiver};
pub use segmenter::{segment, split, Fragment};
pub use speed::SpeedProfile;
