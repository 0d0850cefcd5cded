//! Binary codec shared by every NFS wire type.
//!
//! All wire values go through bincode with a hard size cap and trailing
//! bytes rejected, so a truncated, padded or oversized buffer is a decode
//! failure rather than a partially read value.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error_code::ErrorDomain;

/// Maximum content size carried by a single PUT or GET (4MB).
pub const MAX_CONTENT_SIZE: usize = 4 * 1024 * 1024;

/// Maximum wire message size: content payload + envelope overhead.
///
/// 64 KiB of headroom covers names, version lists and return codes.
pub const MAX_WIRE_MESSAGE_SIZE: u64 = MAX_CONTENT_SIZE as u64 + 64 * 1024;

/// Return size-limited bincode options to prevent OOM from malicious input.
fn bincode_options() -> impl Options {
    bincode::options()
        .with_limit(MAX_WIRE_MESSAGE_SIZE)
        .reject_trailing_bytes()
}

/// Serialize a wire value.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    bincode_options()
        .serialize(value)
        .map_err(|e| ProtocolError::SerializationFailed(e.to_string()))
}

/// Deserialize a wire value, capped at [`MAX_WIRE_MESSAGE_SIZE`].
pub(crate) fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, ProtocolError> {
    bincode_options()
        .deserialize(data)
        .map_err(|e| ProtocolError::DeserializationFailed(e.to_string()))
}

/// A value with a flat wire representation that may be stricter than the
/// in-memory type.
///
/// `from_wire` is where shape invariants (mutual exclusivity, known error
/// domains) are enforced, so `decode` never hands out an ambiguous value.
pub trait WireFormat: Sized {
    /// Flat serialized form.
    type Wire: Serialize + DeserializeOwned;

    /// Convert to the wire form.
    fn to_wire(&self) -> Self::Wire;

    /// Validate and convert from the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the wire value violates the type's invariants.
    fn from_wire(wire: Self::Wire) -> Result<Self, ProtocolError>;

    /// Encode to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        encode(&self.to_wire())
    }

    /// Decode from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are malformed, reference an unknown
    /// error domain, or violate the type's invariants.
    fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_wire(decode(data)?)
    }
}

/// Implement `Serialize`/`Deserialize` through a type's [`WireFormat`], so the
/// type can be nested in larger messages with the same validation.
macro_rules! serde_via_wire {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serde::Serialize::serialize(
                        &$crate::nfs_protocol::codec::WireFormat::to_wire(self),
                        serializer,
                    )
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    type Wire = <$ty as $crate::nfs_protocol::codec::WireFormat>::Wire;
                    let wire = <Wire as serde::Deserialize>::deserialize(deserializer)?;
                    <$ty as $crate::nfs_protocol::codec::WireFormat>::from_wire(wire)
                        .map_err(serde::de::Error::custom)
                }
            }
        )+
    };
}

pub(crate) use serde_via_wire;

// =============================================================================
// Protocol Errors
// =============================================================================

/// Errors raised while encoding, decoding or constructing wire values.
///
/// These are distinct from domain errors a peer reports inside a
/// [`ReturnCode`](super::ReturnCode): a `ProtocolError` means the value could
/// not be produced at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Message serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// Bytes were malformed or violated a wire invariant.
    #[error("deserialization failed: {0}")]
    DeserializationFailed(String),

    /// A return code named an error domain this build does not know.
    #[error("unknown error domain {0}")]
    UnknownErrorDomain(u16),

    /// A return code value is out of range for its domain.
    #[error("invalid value {value} for error domain {domain}")]
    InvalidErrorValue {
        /// The (known) domain.
        domain: ErrorDomain,
        /// The out-of-range value.
        value: i32,
    },

    /// A constructor was given a mutually exclusive combination of fields.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// A well-formed message arrived where a different one was expected.
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),

    /// Content exceeds [`MAX_CONTENT_SIZE`].
    #[error("content size {size} exceeds maximum {max_size}")]
    ContentTooLarge {
        /// Size of the content in bytes.
        size: usize,
        /// Maximum allowed size.
        max_size: usize,
    },

    /// Content does not hash to the name it was stored under.
    #[error("address mismatch: expected {}, got {}", hex::encode(expected), hex::encode(actual))]
    AddressMismatch {
        /// Expected address.
        expected: [u8; 32],
        /// Address computed from content.
        actual: [u8; 32],
    },
}

impl ProtocolError {
    /// Whether this error came from rejecting received bytes.
    #[must_use]
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::DeserializationFailed(_)
                | Self::UnknownErrorDomain(_)
                | Self::InvalidErrorValue { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: u64,
        payload: Vec<u8>,
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&Sample {
            id: 7,
            payload: vec![1, 2, 3],
        })
        .expect("encode");
        bytes.push(0);

        let err = decode::<Sample>(&bytes).unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_truncated_input_rejected() {
        let bytes = encode(&Sample {
            id: 7,
            payload: vec![1, 2, 3],
        })
        .expect("encode");

        let result = decode::<Sample>(&bytes[..bytes.len() - 1]);
        assert!(matches!(
            result,
            Err(ProtocolError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn test_oversized_length_prefix_rejected() {
        // id = 7, then a varint u64 length prefix claiming u64::MAX bytes.
        let mut bytes = vec![7u8, 253];
        bytes.extend_from_slice(&[0xFF; 8]);
        assert!(decode::<Sample>(&bytes).is_err());
    }

    #[test]
    fn test_decode_failure_classification() {
        assert!(ProtocolError::UnknownErrorDomain(99).is_decode_failure());
        assert!(ProtocolError::InvalidErrorValue {
            domain: ErrorDomain::General,
            value: -1
        }
        .is_decode_failure());
        assert!(!ProtocolError::InvalidEnvelope("both".into()).is_decode_failure());
        assert!(!ProtocolError::SerializationFailed("x".into()).is_decode_failure());
    }

    #[test]
    fn test_address_mismatch_display() {
        let err = ProtocolError::AddressMismatch {
            expected: [0xAA; 32],
            actual: [0xBB; 32],
        };
        let display = err.to_string();
        assert!(display.contains("address mismatch"));
        assert!(display.contains(&hex::encode([0xAA; 32])));
    }
}
