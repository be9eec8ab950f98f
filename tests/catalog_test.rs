use std::collections::HashSet;

mod common;
use common::mock_backend::MockBackend;
use common::TestContext;
use tuxreader::speech::catalog::PLACEHOLDER_VOICE;
use tuxreader::speech::SpeedProfile;
use tuxreader::tts::Voice;

/// espeak-style voice names: a family, then `+variant` suffixes
fn crowded_backend() -> MockBackend {
    let voices = (0..500)
        .map(|i| {
            let family = match i % 50 {
                0 => "English (America)".to_string(),
                7 => "Deutsch".to_string(),
                n => format!("Language {}", n),
            };
            Voice::new(format!("{}+v{}", family, i / 50), format!("x{:02}", i % 50))
        })
        .collect();
    MockBackend::with_voices(voices)
}

#[test]
fn test_crowded_catalog_collapses() {
    let ctx = TestContext::new(crowded_backend());
    let catalog = ctx.engine.catalog();

    let voices = catalog.list();
    assert!(catalog.is_collapsed());
    assert!(voices.len() < 500);
    let locales: HashSet<&str> = voices.iter().map(|v| v.locale.as_str()).collect();
    assert_eq!(locales.len(), 50);
    assert_eq!(catalog.names().len(), 500);
}

#[tokio::test]
async fn test_collapse_follows_selected_voice() {
    let ctx = TestContext::new(crowded_backend());

    ctx.engine
        .speak("Hallo", Some("Deutsch+v3"), &SpeedProfile::DEFAULT)
        .await;
    ctx.wait_idle().await;
    assert_eq!(ctx.backend.active_voice().as_deref(), Some("Deutsch+v3"));

    let voices = ctx.engine.catalog().list();
    // family members first, numbered variants (other than 1) hidden
    assert_eq!(voices[0].name, "Deutsch+v1");
    assert!(voices.iter().all(|v| v.name != "Deutsch+v3"));
}

#[test]
fn test_small_catalog_not_collapsed() {
    let ctx = TestContext::new(MockBackend::new());
    let catalog = ctx.engine.catalog();
    assert_eq!(catalog.list().len(), 2);
    assert!(!catalog.is_collapsed());
}

#[test]
fn test_by_name_falls_back_to_first_listed() {
    let ctx = TestContext::new(MockBackend::new());
    let catalog = ctx.engine.catalog();
    let first = catalog.list().remove(0);
    assert_eq!(catalog.by_name(Some("nonexistent-voice")), first);
}

#[test]
fn test_empty_backend_uses_placeholder() {
    let ctx = TestContext::new(MockBackend::with_voices(Vec::new()));
    let voices = ctx.engine.catalog().list();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].name, PLACEHOLDER_VOICE);
    assert_eq!(ctx.engine.catalog().locale_of(None).tag(), "en-US");
}

#[test]
fn test_locale_of_voice() {
    let ctx = TestContext::new(MockBackend::new());
    let catalog = ctx.engine.catalog();
    assert_eq!(catalog.locale_of(Some("Deutsch")).language(), "de");
    assert_eq!(catalog.locale_of(Some("unknown")).tag(), "en-US");
}
