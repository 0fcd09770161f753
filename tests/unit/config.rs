use super::*;

#[test]
fn empty_settings_resolve_to_defaults() {
    let config = SplitViewConfig::from_settings(&Settings::default(), false);
    assert_eq!(config.split_ratio, DEFAULT_SPLIT_RATIO);
    assert_eq!(config.min_pane_width, DEFAULT_MIN_PANE_WIDTH);
    assert_eq!(config.border_style, BorderStyle::Single);
    assert_eq!(
        config.chord_timeout,
        Duration::from_millis(DEFAULT_CHORD_TIMEOUT_MS)
    );
    assert_eq!(config.left.program, DEFAULT_ASSISTANT);
    assert_eq!(config.left.title, "assistant");
    assert_eq!(config.right.title, "dashboard");
    assert!(!config.single_pane);
}

#[test]
fn out_of_range_ratio_falls_back() {
    for bad in [0.0, 1.0, -0.5, 3.0, f64::NAN] {
        let settings = Settings {
            split_ratio: Some(bad),
            ..Settings::default()
        };
        let config = SplitViewConfig::from_settings(&settings, false);
        assert_eq!(config.split_ratio, DEFAULT_SPLIT_RATIO, "{bad}");
    }
}

#[test]
fn command_lines_split_into_program_and_args() {
    let settings = Settings {
        assistant: Some("my-assistant --fast  --model big".to_string()),
        dashboard: Some("   ".to_string()),
        ..Settings::default()
    };
    let config = SplitViewConfig::from_settings(&settings, true);
    assert_eq!(config.left.program, "my-assistant");
    assert_eq!(config.left.args, vec!["--fast", "--model", "big"]);
    assert!(!config.right.program.is_empty());
    assert!(config.single_pane);
}

#[test]
fn merge_prefers_overrides() {
    let file = Settings {
        split_ratio: Some(0.3),
        min_pane_width: Some(30),
        ..Settings::default()
    };
    let cli = Settings {
        split_ratio: Some(0.6),
        ..Settings::default()
    };
    let merged = file.merge(cli);
    assert_eq!(merged.split_ratio, Some(0.6));
    assert_eq!(merged.min_pane_width, Some(30));
}

#[test]
fn settings_file_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    ensure_settings_file_at(&path).unwrap();
    let loaded = load_settings_from(&path).unwrap();
    assert_eq!(loaded.split_ratio, Some(DEFAULT_SPLIT_RATIO));
    assert_eq!(loaded.assistant.as_deref(), Some(DEFAULT_ASSISTANT));

    // Existing files are left alone.
    std::fs::write(&path, r#"{"border_style":"rounded","min_pane_width":25}"#).unwrap();
    ensure_settings_file_at(&path).unwrap();
    let loaded = load_settings_from(&path).unwrap();
    assert_eq!(loaded.border_style, Some(BorderStyle::Rounded));
    assert_eq!(loaded.min_pane_width, Some(25));
    assert_eq!(loaded.split_ratio, None);
}

#[test]
fn invalid_settings_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_settings_from(&path).is_none());
    assert!(load_settings_from(&dir.path().join("missing.json")).is_none());
}

#[test]
fn border_style_parses_aliases() {
    assert_eq!(BorderStyle::parse("Round"), Some(BorderStyle::Rounded));
    assert_eq!(BorderStyle::parse("thick"), Some(BorderStyle::Heavy));
    assert_eq!(BorderStyle::parse("dotted"), None);
}
