//! Version tree operations through the client.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use saorsa_nfs::nfs_protocol::{CommonError, DataName, DataTagValue, VaultError};
use saorsa_nfs::{ErrorCode, VersionName, VersionTreeError, VersionTreeLimits};

use super::TestHarness;

fn object_name(seed: u8) -> DataName {
    DataName::new(DataTagValue::MutableData, [seed; 32])
}

fn version(index: u64) -> VersionName {
    let mut id = [0u8; 32];
    id[..8].copy_from_slice(&index.to_be_bytes());
    VersionName::new(index, id)
}

fn forked(index: u64, seed: u8) -> VersionName {
    let mut id = [seed; 32];
    id[..8].copy_from_slice(&index.to_be_bytes());
    VersionName::new(index, id)
}

#[tokio::test]
async fn test_single_branch_keeps_newest_versions() {
    let harness = TestHarness::setup();
    let client = harness.client();
    let name = object_name(1);

    client
        .create_version_tree(name, version(0), Some(VersionTreeLimits::new(5, 1)), None)
        .await
        .expect("create");
    for index in 1..=9 {
        let tip = client
            .put_version(name, version(index - 1), version(index), None)
            .await
            .expect("put version");
        assert_eq!(tip, version(index));
    }

    let tips = client.get_versions(name, None).await.expect("versions");
    assert_eq!(tips, vec![version(9)]);

    let tip = client
        .put_version(name, version(7), version(8), None)
        .await
        .expect("repeated put");
    assert_eq!(tip, version(9));

    let branch = client
        .get_branch(name, version(9), None)
        .await
        .expect("branch");
    let expected: Vec<_> = (5..=9).rev().map(version).collect();
    assert_eq!(branch, expected);
}

#[tokio::test]
async fn test_fork_from_interior_version() {
    let harness = TestHarness::setup();
    let client = harness.client();
    let name = object_name(2);

    client
        .create_version_tree(name, version(0), Some(VersionTreeLimits::new(10, 2)), None)
        .await
        .expect("create");
    for index in 1..=3 {
        client
            .put_version(name, version(index - 1), version(index), None)
            .await
            .expect("put version");
    }
    client
        .put_version(name, version(1), forked(2, 0xAA), None)
        .await
        .expect("fork");

    let tips = client.get_versions(name, None).await.expect("versions");
    assert_eq!(tips, vec![version(3), forked(2, 0xAA)]);

    let fork = client
        .get_branch(name, forked(2, 0xAA), None)
        .await
        .expect("fork branch");
    assert_eq!(fork, vec![forked(2, 0xAA), version(1), version(0)]);

    let error = client
        .put_version(name, version(2), forked(3, 0xBB), None)
        .await
        .expect_err("third branch exceeds the limit");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::MaxBranchesExceeded)
    ));
    assert_eq!(
        error.error_code(),
        Some(ErrorCode::StorageNode(VaultError::TooManyBranches))
    );
}

#[tokio::test]
async fn test_unknown_versions_are_rejected() {
    let harness = TestHarness::setup();
    let client = harness.client();
    let name = object_name(3);

    client
        .create_version_tree(name, version(0), None, None)
        .await
        .expect("create");

    let error = client
        .put_version(name, forked(4, 0xCC), version(5), None)
        .await
        .expect_err("unknown parent");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::VersionNotFound)
    ));

    let error = client
        .get_branch(name, version(7), None)
        .await
        .expect_err("unknown tip");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::VersionNotFound)
    ));
}

#[tokio::test]
async fn test_new_version_must_follow_old() {
    let harness = TestHarness::setup();
    let client = harness.client();
    let name = object_name(4);

    client
        .create_version_tree(name, version(3), None, None)
        .await
        .expect("create");
    let error = client
        .put_version(name, version(3), version(2), None)
        .await
        .expect_err("index must increase");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::InvalidArgument)
    ));
    assert_eq!(
        error.error_code(),
        Some(ErrorCode::General(CommonError::InvalidArgument))
    );
}

#[tokio::test]
async fn test_absent_tree_is_not_found() {
    let harness = TestHarness::setup();
    let client = harness.client();
    let name = object_name(5);

    let error = client
        .get_versions(name, None)
        .await
        .expect_err("no tree yet");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::NotFound)
    ));

    let error = client
        .put_version(name, version(0), version(1), None)
        .await
        .expect_err("no tree yet");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::NotFound)
    ));
}

#[tokio::test]
async fn test_create_twice_reports_already_exists() {
    let harness = TestHarness::setup();
    let client = harness.client();
    let name = object_name(6);

    client
        .create_version_tree(name, version(0), None, None)
        .await
        .expect("create");
    let error = client
        .create_version_tree(name, version(0), None, None)
        .await
        .expect_err("second create");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::AlreadyExists)
    ));
    assert!(harness.handler().version_trees().contains(&name));
}

#[tokio::test]
async fn test_zero_limits_fail_without_sending() {
    let harness = TestHarness::setup();
    let error = harness
        .client()
        .create_version_tree(
            object_name(7),
            version(0),
            Some(VersionTreeLimits::new(0, 1)),
            None,
        )
        .await
        .expect_err("zero limits");
    assert!(matches!(
        error,
        saorsa_nfs::Error::VersionTree(VersionTreeError::InvalidArgument)
    ));
    assert_eq!(harness.transport().sent(), 0);
}
