//! Tests for error types

use emote_batch::config::ConfigError;
use emote_batch::core::{DispatchError, ItemError};
use emote_batch::infra::VisionError;

#[test]
fn test_no_items_error() {
    let err = DispatchError::NoItems;
    assert_eq!(format!("{}", err), "no work items supplied");
}

#[test]
fn test_invalid_bound_error() {
    let err = DispatchError::InvalidBound("max_concurrent must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid bound: max_concurrent must be greater than 0"
    );
}

#[test]
fn test_vision_error_is_transparent() {
    let err: ItemError = VisionError::Api {
        status: 401,
        message: "invalid api key".to_string(),
    }
    .into();
    assert_eq!(format!("{}", err), "API error: 401 - invalid api key");

    let err: ItemError = VisionError::NoToolCall.into();
    assert_eq!(format!("{}", err), "no tool calls found");
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
    let err: ItemError = io.into();
    assert!(matches!(err, ItemError::Io(_)));
    assert_eq!(format!("{}", err), "io error: missing.png");
}

#[test]
fn test_panicked_error() {
    let err = ItemError::Panicked("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "processor panicked: index out of bounds");
}

#[test]
fn test_config_error() {
    let err = ConfigError::Invalid("rate_per_minute must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: rate_per_minute must be greater than 0"
    );
}

#[test]
fn test_errors_convert_to_anyhow() {
    let err: anyhow::Error = DispatchError::NoItems.into();
    assert_eq!(err.to_string(), "no work items supplied");
}
