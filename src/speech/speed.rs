//! Playback speed presets

use std::fmt;

/// A named playback rate preset.
///
/// `rate` is passed straight to the backend (-100 very slow, +100 very fast).
/// Faster presets set `suppress_pauses` so sentence breaks inside a fragment
/// are shortened. Settings persist the label, see [`SpeedProfile::by_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedProfile {
    pub rate: i32,
    pub label: &'static str,
    pub suppress_pauses: bool,
}

impl SpeedProfile {
    pub const DEFAULT: SpeedProfile = SpeedProfile::new(15, "Normal", false);

    pub const fn new(rate: i32, label: &'static str, suppress_pauses: bool) -> Self {
        Self {
            rate,
            label,
            suppress_pauses,
        }
    }

    /// All presets, slowest first
    pub fn all() -> &'static [SpeedProfile] {
        &SPEEDS
    }

    /// Look up a preset by label (case-insensitive)
    pub fn by_label(label: &str) -> Option<SpeedProfile> {
        SPEEDS
            .iter()
            .find(|s| s.label.eq_ignore_ascii_case(label.trim()))
            .copied()
    }
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SpeedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

const SPEEDS: [SpeedProfile; 6] = [
    SpeedProfile::new(-25, "Slow", false),
    SpeedProfile::new(0, "Relaxed", false),
    SpeedProfile::DEFAULT,
    SpeedProfile::new(35, "Fast", true),
    SpeedProfile::new(50, "Faster", true),
    SpeedProfile::new(90, "Fastest", true),
];
