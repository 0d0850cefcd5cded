//! Names, content and payload types carried inside NFS envelopes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Network address of a stored object (32 bytes).
pub type XorName = [u8; 32];

/// Compute the content address (SHA256 hash) for the given data.
///
/// An immutable chunk's name is always `SHA256(content)`.
#[must_use]
pub fn compute_address(content: &[u8]) -> XorName {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

/// Kind of data stored under a name.
///
/// The same raw name may hold different kinds of data, so every name on the
/// wire is qualified by its tag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DataTagValue {
    /// Content-addressed immutable chunk.
    #[default]
    ImmutableData,
    /// Directory owned by a single client.
    OwnerDirectory,
    /// Directory shared by a group.
    GroupDirectory,
    /// Publicly readable directory.
    WorldDirectory,
    /// Mutable data addressed by owner.
    MutableData,
    /// Public MAID key.
    PublicMaid,
    /// Public PMID key.
    PublicPmid,
    /// Public MPID key.
    PublicMpid,
}

impl DataTagValue {
    /// Whether routing may serve this kind from intermediate caches.
    ///
    /// Only content-addressed data can be cached safely, since a cached copy
    /// is self-verifying.
    #[must_use]
    pub const fn is_cacheable(self) -> bool {
        matches!(self, Self::ImmutableData)
    }
}

/// A tagged network name.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DataName {
    /// Kind of data.
    pub tag: DataTagValue,
    /// Raw network address.
    pub raw_name: XorName,
}

impl DataName {
    /// Create a new name.
    #[must_use]
    pub const fn new(tag: DataTagValue, raw_name: XorName) -> Self {
        Self { tag, raw_name }
    }

    /// Name of an immutable chunk holding `content`.
    #[must_use]
    pub fn for_immutable(content: &[u8]) -> Self {
        Self::new(DataTagValue::ImmutableData, compute_address(content))
    }
}

impl fmt::Display for DataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.tag, hex::encode(self.raw_name))
    }
}

/// Serialized content of a stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Content(pub Bytes);

impl Content {
    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the content is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Content {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }
}

/// One node in a version history: a sequence index and the name of the
/// immutable chunk holding that version.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VersionName {
    /// Position in the history, monotonic within a branch.
    pub index: u64,
    /// Content identifier of the version.
    pub id: XorName,
}

impl VersionName {
    /// Create a new version name.
    #[must_use]
    pub const fn new(index: u64, id: XorName) -> Self {
        Self { index, id }
    }
}

impl fmt::Display for VersionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.index, &hex::encode(self.id)[..8])
    }
}

/// Ordered list of versions returned by version queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredData {
    /// Versions, in the order defined by the query.
    pub versions: Vec<VersionName>,
}

impl StructuredData {
    /// Wrap a list of versions.
    #[must_use]
    pub fn new(versions: Vec<VersionName>) -> Self {
        Self { versions }
    }
}

// =============================================================================
// Vault payloads
// =============================================================================

/// A name together with its content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndContent {
    /// Name of the data.
    pub name: DataName,
    /// The content.
    pub content: Content,
}

/// A name together with one of its versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameAndVersion {
    /// Name of the versioned object.
    pub name: DataName,
    /// The version.
    pub version: VersionName,
}

/// A name together with a version and its successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNameOldNewVersion {
    /// Name of the versioned object.
    pub name: DataName,
    /// Existing version.
    pub old_version: VersionName,
    /// New successor version.
    pub new_version: VersionName,
}

/// Data together with the storage node expected to hold it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAndPmidHint {
    /// The data.
    pub data: DataNameAndContent,
    /// Suggested PMID node.
    pub pmid_hint: XorName,
}

/// Health report of a storage node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmidHealth {
    /// PMID node name.
    pub pmid_name: XorName,
    /// Space offered by the node in bytes.
    pub available_size: u64,
    /// Bytes currently stored.
    pub stored_total_size: u64,
    /// Bytes lost by the node.
    pub lost_total_size: u64,
}

/// Registration of a storage node against a client account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PmidRegistration {
    /// Owning client account.
    pub maid_name: XorName,
    /// Registered PMID node.
    pub pmid_name: XorName,
    /// Whether this is a de-registration.
    pub unregister: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_address() {
        // Known SHA256 hash of "hello world"
        let address = compute_address(b"hello world");
        let expected_hex = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        assert_eq!(hex::encode(address), expected_hex);
    }

    #[test]
    fn test_immutable_name() {
        let name = DataName::for_immutable(b"hello world");
        assert_eq!(name.tag, DataTagValue::ImmutableData);
        assert_eq!(name.raw_name, compute_address(b"hello world"));
    }

    #[test]
    fn test_names_differ_by_tag() {
        let raw = [0x11; 32];
        assert_ne!(
            DataName::new(DataTagValue::ImmutableData, raw),
            DataName::new(DataTagValue::MutableData, raw)
        );
    }

    #[test]
    fn test_cacheability() {
        assert!(DataTagValue::ImmutableData.is_cacheable());
        assert!(!DataTagValue::MutableData.is_cacheable());
        assert!(!DataTagValue::OwnerDirectory.is_cacheable());
    }

    #[test]
    fn test_version_name_display() {
        let version = VersionName::new(3, [0xAB; 32]);
        assert_eq!(version.to_string(), "3@abababab");
    }
}
