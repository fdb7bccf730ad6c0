use jarvis_calendar::calendar::classify::DEFAULT_URGENCY_THRESHOLD_DAYS;
use jarvis_calendar::calendar::UrgencyPolicy;
use jarvis_calendar::config::{Settings, DEFAULT_SETTINGS_PATH};
use jarvis_calendar::narration::NarrationConfig;
use std::path::Path;
use std::time::Duration;

/// Smoke test to verify that the shipped settings file parses
#[test]
fn test_shipped_settings_load() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_SETTINGS_PATH);
    let settings = Settings::load(&path).unwrap();

    assert_eq!(settings.urgency_threshold_days, DEFAULT_URGENCY_THRESHOLD_DAYS);
    assert!(settings.speech.enabled);
    assert_eq!(settings.audio.probe[0], "pactl");
}

/// Settings feed the classifier and the narration driver
#[test]
fn test_settings_drive_components() {
    let settings = Settings::from_toml(
        r#"
        urgency_threshold_days = 1

        [narration]
        poll_interval_ms = 250
        max_wait_ms = 1000
        "#,
    )
    .unwrap();

    let policy = UrgencyPolicy::from_days(settings.urgency_threshold_days);
    assert_eq!(policy.threshold(), chrono::Duration::days(1));

    let narration = NarrationConfig::from(settings.narration);
    assert_eq!(narration.poll_interval, Duration::from_millis(250));
    assert_eq!(narration.max_polls(), 4);
}
