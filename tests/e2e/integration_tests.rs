//! Data operations and the single-resolution guarantee, end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use bytes::Bytes;
use saorsa_nfs::nfs_protocol::VaultError;
use saorsa_nfs::{DataChunk, Error, ErrorCode};

use super::TestHarness;

/// Give spawned loopback tasks time to finish delivering.
async fn settle_transport(latency: Duration) {
    tokio::time::sleep(latency + Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_put_then_get_chunk() {
    let harness = TestHarness::setup();
    let chunk = DataChunk::from_content(Bytes::from("hello saorsa"));

    harness
        .client()
        .put(&chunk, None)
        .await
        .expect("put should succeed");
    assert_eq!(harness.handler().store().len(), 1);

    let fetched: DataChunk = harness
        .client()
        .get(&chunk.address, None)
        .await
        .expect("get should succeed");
    assert_eq!(fetched, chunk);
    assert!(fetched.verify());
    assert_eq!(harness.client().pending_count(), 0);
}

#[tokio::test]
async fn test_duplicate_put_is_idempotent() {
    let harness = TestHarness::setup();
    let chunk = DataChunk::from_content(Bytes::from("stored twice"));

    harness.client().put(&chunk, None).await.expect("first put");
    harness.client().put(&chunk, None).await.expect("second put");
    assert_eq!(harness.handler().store().len(), 1);
}

#[tokio::test]
async fn test_get_missing_chunk_reports_no_such_data() {
    let harness = TestHarness::setup();
    let absent = DataChunk::from_content(Bytes::from("never stored"));

    let error = harness
        .client()
        .get::<DataChunk>(&absent.address, None)
        .await
        .expect_err("get of missing data should fail");
    assert_eq!(
        error.error_code(),
        Some(ErrorCode::StorageNode(VaultError::NoSuchData))
    );
}

#[tokio::test]
async fn test_put_with_wrong_address_is_rejected() {
    let harness = TestHarness::setup();
    let forged = DataChunk::new([7; 32], Bytes::from("content for another address"));

    let error = harness
        .client()
        .put(&forged, None)
        .await
        .expect_err("mismatched address should be rejected");
    assert_eq!(
        error.error_code(),
        Some(ErrorCode::StorageNode(VaultError::InvalidContent))
    );
    assert!(harness.handler().store().is_empty());
}

#[tokio::test]
async fn test_unanswered_request_times_out() {
    let harness = TestHarness::setup();
    harness.transport().set_muted(true);
    let chunk = DataChunk::from_content(Bytes::from("into the void"));

    let error = harness
        .client()
        .put(&chunk, Some(Duration::from_millis(50)))
        .await
        .expect_err("muted transport should time out");
    assert!(error.is_timeout(), "unexpected error: {error}");
    assert_eq!(harness.transport().sent(), 1);
    assert_eq!(harness.client().pending_count(), 0);
}

#[tokio::test]
async fn test_late_response_after_timeout_is_ignored() {
    let latency = Duration::from_millis(200);
    let harness = TestHarness::setup_with(|transport| transport.with_latency(latency));
    let chunk = DataChunk::from_content(Bytes::from("slow network"));

    let error = harness
        .client()
        .put(&chunk, Some(Duration::from_millis(20)))
        .await
        .expect_err("response slower than the timeout");
    assert!(error.is_timeout());

    settle_transport(latency).await;
    // The request still reached the handler and its answer was delivered.
    assert_eq!(harness.transport().delivered(), 1);
    assert_eq!(harness.handler().store().len(), 1);
    assert_eq!(harness.client().pending_count(), 0);
}

#[tokio::test]
async fn test_stop_cancels_pending_operations() {
    let latency = Duration::from_millis(200);
    let harness = TestHarness::setup_with(|transport| transport.with_latency(latency));
    let chunk = DataChunk::from_content(Bytes::from("cancel me"));

    let put = harness.client().put(&chunk, None);
    let get = harness.client().get::<DataChunk>(&chunk.address, None);
    assert_eq!(harness.client().pending_count(), 2);
    assert_eq!(harness.client().stop(), 2);

    assert!(put.await.expect_err("cancelled").is_cancelled());
    assert!(get.await.expect_err("cancelled").is_cancelled());

    settle_transport(latency).await;
    assert_eq!(harness.transport().delivered(), 2);
    assert_eq!(harness.client().pending_count(), 0);
}

#[tokio::test]
async fn test_operations_after_stop_are_cancelled_without_sending() {
    let harness = TestHarness::setup();
    harness.client().stop();
    assert!(harness.client().is_stopped());

    let chunk = DataChunk::from_content(Bytes::from("too late"));
    let error = harness
        .client()
        .put(&chunk, None)
        .await
        .expect_err("stopped client");
    assert!(error.is_cancelled());
    assert_eq!(harness.transport().sent(), 0);
}

#[tokio::test]
async fn test_first_group_response_wins() {
    let harness = TestHarness::setup_with(|transport| transport.with_group_size(3));
    let chunk = DataChunk::from_content(Bytes::from("answered by a group"));

    harness.client().put(&chunk, None).await.expect("put");
    let fetched = harness
        .client()
        .get::<DataChunk>(&chunk.address, None)
        .await
        .expect("get");
    assert_eq!(fetched, chunk);

    settle_transport(Duration::ZERO).await;
    assert_eq!(harness.transport().sent(), 2);
    assert_eq!(harness.transport().delivered(), 6);
    assert_eq!(harness.client().pending_count(), 0);
}

#[tokio::test]
async fn test_many_concurrent_operations() {
    let harness = TestHarness::setup_with(|transport| {
        transport.with_latency(Duration::from_millis(5))
    });
    let chunks: Vec<DataChunk> = (0..32u8)
        .map(|i| DataChunk::from_content(Bytes::from(vec![i; 64])))
        .collect();

    let puts: Vec<_> = chunks
        .iter()
        .map(|chunk| harness.client().put(chunk, None))
        .collect();
    for put in puts {
        put.await.expect("put");
    }

    for chunk in &chunks {
        let fetched = harness
            .client()
            .get::<DataChunk>(&chunk.address, None)
            .await
            .expect("get");
        assert_eq!(&fetched, chunk);
    }
    assert_eq!(harness.handler().store().len(), chunks.len());
}

#[test]
fn test_operation_outside_runtime_fails() {
    let harness = TestHarness::setup();
    let chunk = DataChunk::from_content(Bytes::from("no runtime"));
    let operation = harness.client().put(&chunk, None);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let error = runtime.block_on(operation).expect_err("no runtime at send");
    assert!(matches!(error, Error::Network(_)));
}
