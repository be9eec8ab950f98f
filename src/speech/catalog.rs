//! Voice catalog
//!
//! A rebuildable, locale-sorted view over the backend's voices. Some
//! platforms expose hundreds of numbered variants; past a soft cap the
//! catalog collapses to the voices of the last-used language family plus
//! one voice per other locale.

use crate::locale::Locale;
use crate::tts::{SpeechBackend, Voice};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Above this many raw voices the catalog collapses
pub const SOFT_ENTRY_CAP: usize = 200;
pub const DEFAULT_LANGUAGE_FAMILY: &str = "English (America)";
/// Name of the stand-in voice used when the backend reports none
pub const PLACEHOLDER_VOICE: &str = "No voices found!";

/// How numbered duplicate voices are recognised while collapsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantFilter {
    /// Keep every voice of the language family
    Off,
    /// A name that still ends in a digit once every `1` is removed is a variant
    #[default]
    TrailingDigit,
}

impl VariantFilter {
    pub fn is_variant(&self, name: &str) -> bool {
        match self {
            VariantFilter::Off => false,
            VariantFilter::TrailingDigit => name
                .chars()
                .filter(|c| *c != '1')
                .last()
                .is_some_and(|c| c.is_ascii_digit()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapsePolicy {
    pub soft_cap: usize,
    pub variant_filter: VariantFilter,
}

impl Default for CollapsePolicy {
    fn default() -> Self {
        Self {
            soft_cap: SOFT_ENTRY_CAP,
            variant_filter: VariantFilter::default(),
        }
    }
}

#[derive(Debug)]
pub struct VoiceCatalog {
    backend: Option<Arc<dyn SpeechBackend>>,
    policy: CollapsePolicy,
    /// Family of the last voice that was set successfully, biases collapsing
    language_family: Mutex<String>,
    collapsed: AtomicBool,
}

impl VoiceCatalog {
    pub fn new(backend: Option<Arc<dyn SpeechBackend>>, policy: CollapsePolicy) -> Self {
        Self {
            backend,
            policy,
            language_family: Mutex::new(DEFAULT_LANGUAGE_FAMILY.to_string()),
            collapsed: AtomicBool::new(false),
        }
    }

    /// All backend voices in backend order; never empty
    pub fn raw(&self) -> Vec<Voice> {
        let voices = self
            .backend
            .as_ref()
            .map(|b| b.list_voices())
            .unwrap_or_default();
        if voices.is_empty() {
            vec![Voice::new(PLACEHOLDER_VOICE, "")]
        } else {
            voices
        }
    }

    /// Names of every backend voice
    pub fn names(&self) -> Vec<String> {
        self.raw().into_iter().map(|v| v.name).collect()
    }

    /// The voices to offer, sorted by locale and collapsed past the soft cap
    pub fn list(&self) -> Vec<Voice> {
        let mut voices = self.raw();
        voices.sort_by(|a, b| a.locale.cmp(&b.locale));

        if voices.len() > self.policy.soft_cap {
            self.collapsed.store(true, Ordering::SeqCst);
            let family = self.language_family();
            let collapsed = collapse(&voices, &family, self.policy.variant_filter);
            debug!(
                "Collapsed {} voices to {} (family '{}')",
                voices.len(),
                collapsed.len(),
                family
            );
            collapsed
        } else {
            self.collapsed.store(false, Ordering::SeqCst);
            voices
        }
    }

    /// Whether the last [`list`](Self::list) had to collapse
    pub fn is_collapsed(&self) -> bool {
        self.collapsed.load(Ordering::SeqCst)
    }

    /// Find a listed voice by name, falling back to the first listed voice
    pub fn by_name(&self, name: Option<&str>) -> Voice {
        let mut voices = self.list();
        let index = name
            .and_then(|name| voices.iter().position(|v| v.name == name))
            .unwrap_or(0);
        voices.swap_remove(index)
    }

    /// Make `name` the backend's voice.
    ///
    /// Unknown or missing names silently select the first listed voice.
    /// Returns the voice that ended up active.
    pub fn set_active(&self, name: Option<&str>) -> Voice {
        let Some(backend) = &self.backend else {
            return self.by_name(None);
        };

        let raw = self.raw();
        if let Some(voice) = name.and_then(|name| raw.iter().find(|v| v.name == name)) {
            backend.set_voice(&voice.name);
            let family = voice.name.split('+').next().unwrap_or_default();
            *self
                .language_family
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = family.to_string();
            debug!("🗣️ Voice set to '{}'", voice.name);
            return voice.clone();
        }

        let fallback = self.by_name(None);
        info!(
            "Voice {:?} unavailable, using '{}'",
            name.unwrap_or_default(),
            fallback.name
        );
        if fallback.name != PLACEHOLDER_VOICE {
            backend.set_voice(&fallback.name);
        }
        fallback
    }

    /// Locale of the named voice, or of the first backend voice when the
    /// name is unknown or its voice has no locale
    pub fn locale_of(&self, name: Option<&str>) -> Locale {
        name.and_then(|name| self.list().into_iter().find(|v| v.name == name))
            .and_then(|v| Locale::parse(&v.locale))
            .or_else(|| self.raw().first().and_then(|v| Locale::parse(&v.locale)))
            .unwrap_or_default()
    }

    pub fn language_family(&self) -> String {
        self.language_family
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_language_family(&self, family: impl Into<String>) {
        *self
            .language_family
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = family.into();
    }
}

/// Keep the non-variant voices of `family`, then one voice per locale not yet covered
pub fn collapse(voices: &[Voice], family: &str, filter: VariantFilter) -> Vec<Voice> {
    let mut kept = Vec::new();
    let mut locales: HashSet<&str> = HashSet::new();

    for voice in voices {
        if voice.name.contains(family) && !filter.is_variant(&voice.name) {
            kept.push(voice.clone());
            locales.insert(&voice.locale);
        }
    }
    for voice in voices {
        if locales.insert(&voice.locale) {
            kept.push(voice.clone());
        }
    }
    kept
}
