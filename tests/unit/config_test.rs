//! Tests for configuration loading and validation

use std::io::Write;

use emote_batch::config::{BatchConfig, ConfigError};

#[test]
fn test_default_config_validates() {
    let cfg = BatchConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.rate_per_minute, 60);
    assert_eq!(cfg.max_concurrent, 1);
    assert_eq!(cfg.model, "gpt-4o");
    assert_eq!(cfg.api_base, "https://api.openai.com/v1");
    assert_eq!(cfg.request_timeout().as_secs(), 120);
}

#[test]
fn test_config_invalid_rate() {
    let invalid = BatchConfig {
        rate_per_minute: 0,
        ..BatchConfig::default()
    };
    assert!(matches!(invalid.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_invalid_concurrency() {
    let invalid = BatchConfig {
        max_concurrent: 0,
        ..BatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_timeout() {
    let invalid = BatchConfig {
        request_timeout_secs: 0,
        ..BatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json_partial() {
    let json = r#"{
        "rate_per_minute": 20,
        "max_concurrent": 3,
        "emote_name_prefix": "abc",
        "working_dir": "/srv/emotes"
    }"#;

    let cfg = BatchConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.rate_per_minute, 20);
    assert_eq!(cfg.max_concurrent, 3);
    assert_eq!(cfg.emote_name_prefix, "abc");
    assert_eq!(cfg.working_dir.as_deref(), Some(std::path::Path::new("/srv/emotes")));
    // untouched fields keep their defaults
    assert_eq!(cfg.model, "gpt-4o");
}

#[test]
fn test_config_from_json_rejects_zero() {
    let err = BatchConfig::from_json_str(r#"{"max_concurrent": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_config_from_json_malformed() {
    let err = BatchConfig::from_json_str("{ rate_per_minute: ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let err = BatchConfig::from_json_str(r#"{"max_concurrent": "two"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"model": "gpt-4o-mini", "prompt_text": "Describe this emote."}}"#).unwrap();

    let cfg = BatchConfig::from_file(file.path()).unwrap();
    assert_eq!(cfg.model, "gpt-4o-mini");
    assert_eq!(cfg.prompt_text, "Describe this emote.");
}

#[test]
fn test_config_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BatchConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_config_lookup_matches_env_names() {
    let cfg = BatchConfig::from_lookup(|key| match key {
        "OPENAI_API_RATE_PER_MINUTE" => Some("90".to_string()),
        "OPENAI_API_MAX_CONCURRENT" => Some("5".to_string()),
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "OPENAI_API_BASE" => Some("http://localhost:8000/v1".to_string()),
        "OPENAI_API_TIMEOUT_SECS" => Some("30".to_string()),
        "PROMPT_TEXT" => Some("Tag it.".to_string()),
        "EMOTENAME_PREFIX" => Some("strm".to_string()),
        _ => None,
    });

    assert_eq!(cfg.rate_per_minute, 90);
    assert_eq!(cfg.max_concurrent, 5);
    assert_eq!(cfg.api_key, "sk-test");
    assert_eq!(cfg.api_base, "http://localhost:8000/v1");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.prompt_text, "Tag it.");
    assert_eq!(cfg.emote_name_prefix, "strm");
    assert!(cfg.working_dir.is_none());
    assert!(cfg.validate().is_ok());
}
