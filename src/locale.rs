//! Minimal locale tags
//!
//! Voices report their locale as a tag such as `en-US`, `en_us` or plain
//! `en`. OCR wants the language part in ISO 639-3 form.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    /// Parse a locale tag. Returns `None` for a blank or malformed tag.
    pub fn parse(tag: &str) -> Option<Self> {
        let mut parts = tag.trim().split(['-', '_']);
        let language = parts.next()?.to_ascii_lowercase();
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let region = parts
            .next()
            .filter(|r| !r.is_empty())
            .map(|r| r.to_ascii_uppercase());
        Some(Self { language, region })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn tag(&self) -> String {
        match &self.region {
            Some(region) => format!("{}-{}", self.language, region),
            None => self.language.clone(),
        }
    }

    /// ISO 639-3 code of the language, if known
    pub fn iso639_3(&self) -> Option<&'static str> {
        let code = match self.language.as_str() {
            "ar" => "ara",
            "bg" => "bul",
            "ca" => "cat",
            "cs" => "ces",
            "da" => "dan",
            "de" => "deu",
            "el" => "ell",
            "en" => "eng",
            "es" => "spa",
            "fi" => "fin",
            "fr" => "fra",
            "he" => "heb",
            "hi" => "hin",
            "hu" => "hun",
            "it" => "ita",
            "ja" => "jpn",
            "ko" => "kor",
            "nl" => "nld",
            "no" | "nb" => "nor",
            "pl" => "pol",
            "pt" => "por",
            "ro" => "ron",
            "ru" => "rus",
            "sk" => "slk",
            "sv" => "swe",
            "tr" => "tur",
            "uk" => "ukr",
            "vi" => "vie",
            "zh" => "chi_sim",
            other if other.len() == 3 => return iso639_3_passthrough(other),
            _ => return None,
        };
        Some(code)
    }
}

/// Three-letter tags are already ISO 639-3 for the languages we map
fn iso639_3_passthrough(code: &str) -> Option<&'static str> {
    [
        "ara", "bul", "cat", "ces", "dan", "deu", "ell", "eng", "spa", "fin", "fra", "heb",
        "hin", "hun", "ita", "jpn", "kor", "nld", "nor", "pol", "por", "ron", "rus", "slk",
        "swe", "tur", "ukr", "vie",
    ]
    .into_iter()
    .find(|known| *known == code)
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            region: Some("US".to_string()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        let locale = Locale::parse("en-US").unwrap();
        assert_eq!(locale.language(), "en");
        assert_eq!(locale.region(), Some("US"));

        let locale = Locale::parse("pt_br").unwrap();
        assert_eq!(locale.tag(), "pt-BR");

        let locale = Locale::parse("de").unwrap();
        assert_eq!(locale.region(), None);
        assert_eq!(locale.to_string(), "de");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!(Locale::parse("").is_none());
        assert!(Locale::parse("   ").is_none());
        assert!(Locale::parse("12-34").is_none());
    }

    #[test]
    fn test_iso639_3() {
        assert_eq!(Locale::parse("en-GB").unwrap().iso639_3(), Some("eng"));
        assert_eq!(Locale::parse("fr").unwrap().iso639_3(), Some("fra"));
        assert_eq!(Locale::parse("deu").unwrap().iso639_3(), Some("deu"));
        assert_eq!(Locale::parse("xx").unwrap().iso639_3(), None);
    }
}
