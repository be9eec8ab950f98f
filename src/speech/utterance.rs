//! Speak-time text preparation
//!
//! Applied to each fragment right before it goes to the backend, never at
//! segmentation time, so progress offsets stay aligned to the source text.

use super::speed::SpeedProfile;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A newline with the pause characters after it, or a trailing run of pause characters
    static ref LINE_END_PAUSE: Regex =
        Regex::new(r"\n[.,;:\n ]*|[.,;:\n ]+$").expect("valid line end regex");
    /// A short pause that can be softened to a comma
    static ref LINE_MID_PAUSE: Regex = Regex::new(r"[.,;:\n] ").expect("valid mid pause regex");
    /// Typographic quotes some platform voices trip over
    static ref QUOTES: Regex = Regex::new(r"[‘’“”]").expect("valid quotes regex");
}

/// Prepare one fragment of a speak-by-parts session
pub fn prepare_fragment(fragment: &str, speed: &SpeedProfile) -> String {
    let text = suppress_pauses(fragment, speed);
    let text = LINE_END_PAUSE.replace_all(&text, "");
    substitute(&text)
}

/// Prepare a whole text spoken as a single utterance
pub fn prepare_whole(text: &str, speed: &SpeedProfile) -> String {
    substitute(&suppress_pauses(text, speed))
}

fn suppress_pauses(text: &str, speed: &SpeedProfile) -> String {
    if speed.suppress_pauses {
        LINE_MID_PAUSE.replace_all(text, ", ").into_owned()
    } else {
        text.to_string()
    }
}

fn substitute(text: &str) -> String {
    QUOTES.replace_all(&text.replace('$', " dollars "), "\"").into_owned()
}
