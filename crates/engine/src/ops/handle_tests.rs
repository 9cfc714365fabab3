use super::*;
use std::time::Duration;

fn running() -> (Operation, oneshot::Sender<OperationResult>, CancellationToken) {
    let status = Arc::new(Mutex::new(OperationStatus::Running));
    let cancel = CancellationToken::new();
    let (tx, rx) = oneshot::channel();
    (Operation::new(status, cancel.clone(), rx), tx, cancel)
}

fn done() -> OperationResult {
    OperationResult { results: vec![], targets: vec![], old_node_ids: vec![], error: None }
}

#[tokio::test]
async fn wait_returns_the_result() {
    let (operation, tx, _cancel) = running();
    tx.send(done()).unwrap();

    let result = operation.wait().await.unwrap();
    assert!(result.ok());
}

#[tokio::test]
async fn wait_timeout_expires_without_aborting() {
    let (operation, tx, cancel) = running();

    let err = operation.wait_timeout(Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, OpError::Timeout(_)));
    // the driver side is untouched: not cancelled, sender still usable
    assert!(!cancel.is_cancelled());
    drop(tx);
}

#[tokio::test]
async fn cancel_is_idempotent_and_observable() {
    let (operation, _tx, cancel) = running();

    assert_eq!(operation.status(), OperationStatus::Running);
    operation.cancel();
    operation.cancel();
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn dropped_driver_is_an_internal_error() {
    let (operation, tx, _cancel) = running();
    drop(tx);

    let err = operation.wait().await.unwrap_err();
    assert!(matches!(err, OpError::Internal(_)));
}

#[test]
fn status_display() {
    assert_eq!(OperationStatus::Running.to_string(), "running");
    assert_eq!(OperationStatus::Cancelled.to_string(), "cancelled");
}
