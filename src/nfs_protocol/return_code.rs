//! The unit of failure signalling carried in every response envelope.

use super::codec::{serde_via_wire, ProtocolError, WireFormat};
use super::error_code::{
    ApiError, AsymmError, CommonError, DriveError, ErrorCode, ErrorCodeWire, NfsError,
    PassportError, RoutingError, VaultError,
};

/// Outcome of an operation as reported by a peer.
///
/// The default value is success. Equality compares the normalized
/// `(domain, value)` pair only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// The operation succeeded.
    #[default]
    Success,
    /// The operation failed with the given condition.
    Failure(ErrorCode),
}

impl ReturnCode {
    /// Whether this code denotes success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// The carried error, if this code denotes failure.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Success => None,
            Self::Failure(code) => Some(*code),
        }
    }
}

impl From<ErrorCode> for ReturnCode {
    fn from(error: ErrorCode) -> Self {
        Self::Failure(error)
    }
}

macro_rules! impl_failure_from {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ReturnCode {
                fn from(error: $ty) -> Self {
                    Self::Failure(error.into())
                }
            }
        )+
    };
}

impl_failure_from!(
    CommonError,
    AsymmError,
    PassportError,
    NfsError,
    RoutingError,
    DriveError,
    VaultError,
    ApiError,
);

impl WireFormat for ReturnCode {
    type Wire = ErrorCodeWire;

    fn to_wire(&self) -> ErrorCodeWire {
        match self {
            Self::Success => ErrorCodeWire::SUCCESS,
            Self::Failure(code) => code.to_wire(),
        }
    }

    fn from_wire(wire: ErrorCodeWire) -> Result<Self, ProtocolError> {
        if wire == ErrorCodeWire::SUCCESS {
            return Ok(Self::Success);
        }
        ErrorCode::from_domain_value(wire.domain, wire.value).map(Self::Failure)
    }
}

serde_via_wire!(ReturnCode);
