//! Data types a client can store and fetch.
//!
//! Chunks are immutable, content-addressed blobs where the address is the
//! SHA256 hash of the content. Other kinds of network data plug in through
//! [`NetworkData`].

use bytes::Bytes;

use crate::nfs_protocol::{
    compute_address, Content, DataName, DataTagValue, ProtocolError, XorName, MAX_CONTENT_SIZE,
};

/// A kind of data that can be stored under a [`DataName`] and fetched back.
pub trait NetworkData: Sized + Send + 'static {
    /// Tag of every name of this kind.
    const TAG: DataTagValue;

    /// Name this value is stored under.
    fn data_name(&self) -> DataName;

    /// Serialized content.
    fn to_content(&self) -> Content;

    /// Rebuild a value fetched from `name`, checking it belongs there.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not a valid value for `name`.
    fn from_network(name: &DataName, content: Content) -> Result<Self, ProtocolError>;
}

/// A chunk of data with its content-addressed identifier.
///
/// Chunks are the fundamental storage unit in saorsa. They are:
/// - **Immutable**: Content cannot be changed after storage
/// - **Content-addressed**: Address = SHA256(content)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    /// The content-addressed identifier (SHA256 of content).
    pub address: XorName,
    /// The raw data content.
    pub content: Bytes,
}

impl DataChunk {
    /// Create a new data chunk.
    ///
    /// Note: This does NOT verify that address == SHA256(content).
    /// Use `from_content` for automatic address computation.
    #[must_use]
    pub fn new(address: XorName, content: Bytes) -> Self {
        Self { address, content }
    }

    /// Create a chunk from content, computing the address automatically.
    #[must_use]
    pub fn from_content(content: Bytes) -> Self {
        let address = compute_address(&content);
        Self { address, content }
    }

    /// Get the size of the chunk in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Verify that the address matches SHA256(content).
    #[must_use]
    pub fn verify(&self) -> bool {
        self.address == compute_address(&self.content)
    }
}

impl NetworkData for DataChunk {
    const TAG: DataTagValue = DataTagValue::ImmutableData;

    fn data_name(&self) -> DataName {
        DataName::new(Self::TAG, self.address)
    }

    fn to_content(&self) -> Content {
        Content(self.content.clone())
    }

    fn from_network(name: &DataName, content: Content) -> Result<Self, ProtocolError> {
        if content.len() > MAX_CONTENT_SIZE {
            return Err(ProtocolError::ContentTooLarge {
                size: content.len(),
                max_size: MAX_CONTENT_SIZE,
            });
        }
        let chunk = Self::new(name.raw_name, content.0);
        if !chunk.verify() {
            return Err(ProtocolError::AddressMismatch {
                expected: name.raw_name,
                actual: compute_address(&chunk.content),
            });
        }
        Ok(chunk)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_chunk_creation() {
        let address = [0xAB; 32];
        let content = Bytes::from("test data");
        let chunk = DataChunk::new(address, content.clone());

        assert_eq!(chunk.address, address);
        assert_eq!(chunk.content, content);
        assert_eq!(chunk.size(), 9);
    }

    #[test]
    fn test_chunk_from_content() {
        let content = Bytes::from("hello world");
        let chunk = DataChunk::from_content(content.clone());

        // SHA256 of "hello world"
        let expected: [u8; 32] = [
            0xb9, 0x4d, 0x27, 0xb9, 0x93, 0x4d, 0x3e, 0x08, 0xa5, 0x2e, 0x52, 0xd7, 0xda, 0x7d,
            0xab, 0xfa, 0xc4, 0x84, 0xef, 0xe3, 0x7a, 0x53, 0x80, 0xee, 0x90, 0x88, 0xf7, 0xac,
            0xe2, 0xef, 0xcd, 0xe9,
        ];

        assert_eq!(chunk.address, expected);
        assert!(chunk.verify());
        assert_eq!(chunk.data_name().tag, DataTagValue::ImmutableData);
    }

    #[test]
    fn test_fetched_chunk_is_verified() {
        let chunk = DataChunk::from_content(Bytes::from("test"));
        let name = chunk.data_name();

        let fetched = DataChunk::from_network(&name, chunk.to_content()).expect("valid chunk");
        assert_eq!(fetched, chunk);

        let tampered = DataChunk::from_network(&name, Content::from(b"tset".to_vec()));
        assert!(matches!(
            tampered,
            Err(ProtocolError::AddressMismatch { .. })
        ));
    }

    #[test]
    fn test_oversized_fetch_rejected() {
        let name = DataName::new(DataTagValue::ImmutableData, [0; 32]);
        let result =
            DataChunk::from_network(&name, Content::from(vec![0u8; MAX_CONTENT_SIZE + 1]));
        assert!(matches!(
            result,
            Err(ProtocolError::ContentTooLarge { .. })
        ));
    }
}
