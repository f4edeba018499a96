//! Tests for configuration validation

use prometheus_sharer::config::{ExecutorConfig, MIN_STACK_SIZE};

#[test]
fn test_default_config_is_valid() {
    let cfg = ExecutorConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.queue_capacity, None);
    assert_eq!(cfg.thread_stack_size, None);
}

#[test]
fn test_config_invalid_queue_capacity() {
    let invalid = ExecutorConfig::new().with_queue_capacity(0);
    assert!(invalid.validate().is_err());

    let valid = ExecutorConfig::new().with_queue_capacity(1);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_config_invalid_name() {
    assert!(ExecutorConfig::new().with_name("  ").validate().is_err());
    assert!(ExecutorConfig::new().with_name("db\0conn").validate().is_err());
    assert!(ExecutorConfig::new().with_name("db-conn").validate().is_ok());
}

#[test]
fn test_config_invalid_stack_size() {
    let invalid = ExecutorConfig::new().with_thread_stack_size(MIN_STACK_SIZE - 1);
    assert!(invalid.validate().is_err());

    let valid = ExecutorConfig::new().with_thread_stack_size(MIN_STACK_SIZE);
    assert!(valid.validate().is_ok());
}

#[test]
fn test_config_from_json() {
    let cfg = ExecutorConfig::from_json_str(r#"{"name": "sqlite", "queue_capacity": 64}"#).unwrap();
    assert_eq!(cfg.name.as_deref(), Some("sqlite"));
    assert_eq!(cfg.queue_capacity, Some(64));
    assert_eq!(cfg.thread_stack_size, None);

    let empty = ExecutorConfig::from_json_str("{}").unwrap();
    assert_eq!(empty, ExecutorConfig::default());
}

#[test]
fn test_config_from_json_rejects_invalid() {
    let err = ExecutorConfig::from_json_str(r#"{"queue_capacity": 0}"#).unwrap_err();
    assert!(err.contains("queue_capacity"));

    let err = ExecutorConfig::from_json_str("not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}
