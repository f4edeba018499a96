//! Tests for error types

use std::time::Duration;

use prometheus_sharer::core::{ExecutorError, ShareError};

#[test]
fn test_operation_failed_error() {
    let err: ShareError<String> = ShareError::OperationFailed("division by zero".to_string());
    assert_eq!(format!("{}", err), "operation failed: division by zero");
    assert!(err.is_operation_failure());
    assert_eq!(err.operation_error(), Some("division by zero".to_string()));
}

#[test]
fn test_executor_shut_down_error() {
    let err: ShareError<String> = ShareError::ExecutorShutDown;
    assert_eq!(format!("{}", err), "executor has been shut down");
    assert!(err.is_shut_down());
    assert!(!err.is_operation_failure());
}

#[test]
fn test_worker_fault_error() {
    let err: ShareError<String> = ShareError::WorkerFault("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "worker fault: index out of bounds");
    assert!(err.is_operation_failure());
    assert_eq!(err.operation_error(), None);
}

#[test]
fn test_queue_full_and_timeout_errors() {
    let err: ShareError<String> = ShareError::QueueFull { capacity: 8 };
    assert_eq!(format!("{}", err), "queue full (capacity 8)");

    let err: ShareError<String> = ShareError::TimedOut(Duration::from_millis(250));
    assert_eq!(format!("{}", err), "timed out after 250ms");
}

#[test]
fn test_map_operation_keeps_other_variants() {
    let failed: ShareError<i32> = ShareError::OperationFailed(7);
    assert_eq!(failed.map_operation(|code| format!("code {code}")), ShareError::OperationFailed("code 7".to_string()));

    let shut: ShareError<i32> = ShareError::ExecutorShutDown;
    assert_eq!(shut.map_operation(|code| code.to_string()), ShareError::ExecutorShutDown);
}

#[test]
fn test_executor_errors() {
    let err = ExecutorError::InvalidConfig("queue_capacity must be greater than 0".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: queue_capacity must be greater than 0");

    let err = ExecutorError::InitFailed("no such file".to_string());
    assert_eq!(format!("{}", err), "resource initialization failed: no such file");

    let err = ExecutorError::from(std::io::Error::new(std::io::ErrorKind::Other, "out of threads"));
    assert!(matches!(err, ExecutorError::WorkerSpawn(_)));
    assert_eq!(format!("{}", ExecutorError::WorkerPanicked), "worker thread panicked");
}
