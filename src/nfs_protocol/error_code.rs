//! Domain-qualified error codes.
//!
//! Failures on the network originate in several independently versioned
//! subsystems. Each subsystem owns a closed enumeration, and an [`ErrorCode`]
//! is always one condition from exactly one of them. On the wire a code is a
//! `(domain tag, value)` pair; both halves are validated on decode.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::ProtocolError;

/// Wire tag reserved for the general domain. `(0, 0)` encodes success.
const GENERAL_DOMAIN_TAG: u16 = 0;

/// Declare one error domain: a `#[repr(i32)]` enum with value lookup and a
/// human-readable message per condition.
macro_rules! error_domain {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Every condition in this domain, in wire-value order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire value of this condition.
            #[must_use]
            pub const fn value(self) -> i32 {
                self as i32
            }

            /// Look up a condition by wire value.
            #[must_use]
            pub const fn from_value(value: i32) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Human-readable description.
            #[must_use]
            pub const fn message(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.message())
            }
        }
    };
}

error_domain! {
    /// General-purpose failures shared by every subsystem.
    ///
    /// Value 0 is reserved for success and is not a member.
    CommonError {
        /// A result is still pending.
        PendingResult = 1 => "result still pending",
        /// A required value was missing.
        NullPointer = 2 => "null pointer",
        /// A node id was malformed.
        InvalidNodeId = 3 => "invalid node id",
        /// A key had the wrong size.
        InvalidKeySize = 4 => "invalid key size",
        /// A string had the wrong size.
        InvalidStringSize = 5 => "invalid string size",
        /// A parameter was out of range.
        InvalidParameter = 6 => "invalid parameter",
        /// An argument was invalid.
        InvalidArgument = 7 => "invalid argument",
        /// A type conversion failed.
        InvalidConversion = 8 => "invalid conversion",
        /// A file exceeded the allowed size.
        FileTooLarge = 9 => "file too large",
        /// An object was used before initialisation.
        Uninitialised = 10 => "uninitialised",
        /// An object was initialised twice.
        AlreadyInitialised = 11 => "already initialised",
        /// Hashing failed.
        HashingError = 12 => "hashing error",
        /// A configured limit would have been exceeded.
        CannotExceedLimit = 13 => "cannot exceed limit",
        /// The request could not be handled.
        UnableToHandleRequest = 14 => "unable to handle request",
        /// Filesystem I/O failed.
        FilesystemIoError = 15 => "filesystem I/O error",
        /// The requested element does not exist.
        NoSuchElement = 16 => "no such element",
        /// Serialisation failed.
        SerialisationError = 17 => "serialisation error",
        /// Parsing failed.
        ParsingError = 18 => "parsing error",
        /// Unclassified failure.
        Unknown = 19 => "unknown error",
    }
}

error_domain! {
    /// Asymmetric cryptography failures.
    AsymmError {
        /// Key generation failed.
        KeysGenerationError = 1 => "keys generation error",
        /// Key serialisation failed.
        KeysSerialisationError = 2 => "keys serialisation error",
        /// Key parsing failed.
        KeysParseError = 3 => "keys parse error",
        /// The private key is invalid.
        InvalidPrivateKey = 4 => "invalid private key",
        /// The public key is invalid.
        InvalidPublicKey = 5 => "invalid public key",
        /// Data to sign or encrypt was empty.
        DataEmpty = 6 => "data empty",
        /// A signature did not verify.
        InvalidSignature = 7 => "invalid signature",
        /// A signature was missing.
        SignatureEmpty = 8 => "signature empty",
        /// Encryption failed.
        EncryptionError = 9 => "encryption error",
        /// Decryption failed.
        DecryptionError = 10 => "decryption error",
        /// Signing failed.
        SigningError = 11 => "signing error",
    }
}

error_domain! {
    /// Identity (passport) failures.
    PassportError {
        /// Fob serialisation failed.
        FobSerialisationError = 1 => "fob serialisation error",
        /// Fob parsing failed.
        FobParsingError = 2 => "fob parsing error",
        /// MID parsing failed.
        MidParsingError = 3 => "mid parsing error",
        /// TMID parsing failed.
        TmidParsingError = 4 => "tmid parsing error",
        /// No confirmed fob is available.
        NoConfirmedFob = 5 => "no confirmed fob",
        /// No pending fob is available.
        NoPendingFob = 6 => "no pending fob",
        /// Passport parsing failed.
        PassportParsingError = 7 => "passport parsing error",
        /// The public id is already taken.
        PublicIdAlreadyExists = 8 => "public id already exists",
        /// The public id does not exist.
        NoSuchPublicId = 9 => "no such public id",
    }
}

error_domain! {
    /// Failures of the NFS message layer itself.
    NfsError {
        /// A peer's response could not be interpreted.
        InvalidResponse = 1 => "invalid response",
        /// The request was sent to the wrong persona.
        WrongPersona = 2 => "wrong persona",
        /// The message action is not supported by the receiver.
        UnsupportedAction = 3 => "unsupported action",
        /// Retrieved data failed validation.
        InvalidData = 4 => "invalid data",
    }
}

error_domain! {
    /// Network routing failures, including client-local timeout and
    /// cancellation of in-flight operations.
    RoutingError {
        /// No response arrived before the operation's deadline.
        TimedOut = 1 => "timed out",
        /// The operation was cancelled before a response arrived.
        TimerCancelled = 2 => "timer cancelled",
        /// The node is not connected to the network.
        NotConnected = 3 => "not connected",
        /// The destination is not valid for this message.
        InvalidDestination = 4 => "invalid destination",
        /// The node is not in range of the destination.
        NotInRange = 5 => "not in range",
        /// The node is not among the closest to the destination.
        NotInClosest = 6 => "not in closest",
    }
}

error_domain! {
    /// Virtual drive failures.
    DriveError {
        /// No drive letter is free.
        NoDriveLetterAvailable = 1 => "no drive letter available",
        /// Mounting failed.
        FailedToMount = 2 => "failed to mount",
        /// Unmounting failed.
        FailedToUnmount = 3 => "failed to unmount",
        /// The file does not exist.
        NoSuchFile = 4 => "no such file",
        /// The file already exists.
        FileExists = 5 => "file exists",
        /// The operation is not permitted.
        PermissionDenied = 6 => "permission denied",
        /// The path is malformed.
        InvalidPath = 7 => "invalid path",
    }
}

error_domain! {
    /// Storage node (vault) failures reported by data holders and managers.
    VaultError {
        /// The node could not join the network.
        FailedToJoinNetwork = 1 => "failed to join network",
        /// The node could not handle the request.
        FailedToHandleRequest = 2 => "failed to handle request",
        /// The operation is not supported by this persona.
        OperationNotSupported = 3 => "operation not supported",
        /// The requester is not permitted to perform the operation.
        PermissionDenied = 4 => "permission denied",
        /// The account does not exist.
        NoSuchAccount = 5 => "no such account",
        /// Remaining space is low.
        LowSpace = 6 => "low space",
        /// Not enough space to store the data.
        NotEnoughSpace = 7 => "not enough space",
        /// Different data already exists under this name.
        UniqueDataClash = 8 => "unique data clash",
        /// The data already exists.
        DataAlreadyExists = 9 => "data already exists",
        /// The data does not exist.
        NoSuchData = 10 => "no such data",
        /// The content exceeds the maximum size.
        DataTooLarge = 11 => "data too large",
        /// The content does not match its name.
        InvalidContent = 12 => "invalid content",
        /// No version tree exists under this name.
        NoSuchVersionTree = 13 => "no such version tree",
        /// The version is not present in the tree.
        NoSuchVersion = 14 => "no such version",
        /// The tree already holds its maximum number of branches.
        TooManyBranches = 15 => "too many branches",
    }
}

error_domain! {
    /// Client API failures.
    ApiError {
        /// Account creation failed.
        CreateAccountFailure = 1 => "create account failure",
        /// Login failed.
        LoginFailure = 2 => "login failure",
        /// Logout failed.
        LogoutFailure = 3 => "logout failure",
        /// The password was rejected.
        PasswordFailure = 4 => "password failure",
        /// The keyword was rejected.
        KeywordFailure = 5 => "keyword failure",
        /// The PIN was rejected.
        PinFailure = 6 => "pin failure",
        /// A session is already active.
        SessionAlreadyActive = 7 => "session already active",
    }
}

/// The independent error-code spaces a return code can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorDomain {
    /// [`CommonError`].
    General,
    /// [`AsymmError`].
    Crypto,
    /// [`PassportError`].
    Identity,
    /// [`NfsError`].
    Nfs,
    /// [`RoutingError`].
    NetworkRouting,
    /// [`DriveError`].
    Drive,
    /// [`VaultError`].
    StorageNode,
    /// [`ApiError`].
    Api,
}

impl ErrorDomain {
    /// Every domain known to this build.
    pub const ALL: [Self; 8] = [
        Self::General,
        Self::Crypto,
        Self::Identity,
        Self::Nfs,
        Self::NetworkRouting,
        Self::Drive,
        Self::StorageNode,
        Self::Api,
    ];

    /// Wire tag of this domain.
    #[must_use]
    pub const fn tag(self) -> u16 {
        match self {
            Self::General => GENERAL_DOMAIN_TAG,
            Self::Crypto => 1,
            Self::Identity => 2,
            Self::Nfs => 3,
            Self::NetworkRouting => 4,
            Self::Drive => 5,
            Self::StorageNode => 6,
            Self::Api => 7,
        }
    }

    /// Look up a domain by wire tag.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownErrorDomain`] for tags this build does
    /// not recognise.
    pub fn from_tag(tag: u16) -> Result<Self, ProtocolError> {
        Self::ALL
            .into_iter()
            .find(|domain| domain.tag() == tag)
            .ok_or(ProtocolError::UnknownErrorDomain(tag))
    }

    /// Category name, used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::General => "common",
            Self::Crypto => "asymmetric crypto",
            Self::Identity => "passport",
            Self::Nfs => "nfs",
            Self::NetworkRouting => "routing",
            Self::Drive => "drive",
            Self::StorageNode => "vault",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One failure condition, qualified by the domain it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    /// General failure.
    General(CommonError),
    /// Cryptographic failure.
    Crypto(AsymmError),
    /// Identity failure.
    Identity(PassportError),
    /// NFS message layer failure.
    Nfs(NfsError),
    /// Network routing failure.
    Routing(RoutingError),
    /// Drive failure.
    Drive(DriveError),
    /// Storage node failure.
    StorageNode(VaultError),
    /// Client API failure.
    Api(ApiError),
}

impl ErrorCode {
    /// Resolve a `(domain tag, value)` pair to a known condition.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownErrorDomain`] if the tag is not a known
    /// domain and [`ProtocolError::InvalidErrorValue`] if the value is out of
    /// range for that domain.
    pub fn from_domain_value(domain: u16, value: i32) -> Result<Self, ProtocolError> {
        let domain = ErrorDomain::from_tag(domain)?;
        let code = match domain {
            ErrorDomain::General => CommonError::from_value(value).map(Self::General),
            ErrorDomain::Crypto => AsymmError::from_value(value).map(Self::Crypto),
            ErrorDomain::Identity => PassportError::from_value(value).map(Self::Identity),
            ErrorDomain::Nfs => NfsError::from_value(value).map(Self::Nfs),
            ErrorDomain::NetworkRouting => RoutingError::from_value(value).map(Self::Routing),
            ErrorDomain::Drive => DriveError::from_value(value).map(Self::Drive),
            ErrorDomain::StorageNode => VaultError::from_value(value).map(Self::StorageNode),
            ErrorDomain::Api => ApiError::from_value(value).map(Self::Api),
        };
        code.ok_or(ProtocolError::InvalidErrorValue { domain, value })
    }

    /// Domain this code belongs to.
    #[must_use]
    pub const fn domain(&self) -> ErrorDomain {
        match self {
            Self::General(_) => ErrorDomain::General,
            Self::Crypto(_) => ErrorDomain::Crypto,
            Self::Identity(_) => ErrorDomain::Identity,
            Self::Nfs(_) => ErrorDomain::Nfs,
            Self::Routing(_) => ErrorDomain::NetworkRouting,
            Self::Drive(_) => ErrorDomain::Drive,
            Self::StorageNode(_) => ErrorDomain::StorageNode,
            Self::Api(_) => ErrorDomain::Api,
        }
    }

    /// Value within the domain.
    #[must_use]
    pub const fn value(&self) -> i32 {
        match self {
            Self::General(e) => e.value(),
            Self::Crypto(e) => e.value(),
            Self::Identity(e) => e.value(),
            Self::Nfs(e) => e.value(),
            Self::Routing(e) => e.value(),
            Self::Drive(e) => e.value(),
            Self::StorageNode(e) => e.value(),
            Self::Api(e) => e.value(),
        }
    }

    /// Human-readable description of the condition.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::General(e) => e.message(),
            Self::Crypto(e) => e.message(),
            Self::Identity(e) => e.message(),
            Self::Nfs(e) => e.message(),
            Self::Routing(e) => e.message(),
            Self::Drive(e) => e.message(),
            Self::StorageNode(e) => e.message(),
            Self::Api(e) => e.message(),
        }
    }

    pub(crate) fn to_wire(self) -> ErrorCodeWire {
        ErrorCodeWire {
            domain: self.domain().tag(),
            value: self.value(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error {}: {}", self.domain(), self.value(), self.message())
    }
}

impl std::error::Error for ErrorCode {}

macro_rules! impl_from_domain {
    ($($ty:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ErrorCode {
                fn from(error: $ty) -> Self {
                    Self::$variant(error)
                }
            }
        )+
    };
}

impl_from_domain! {
    CommonError => General,
    AsymmError => Crypto,
    PassportError => Identity,
    NfsError => Nfs,
    RoutingError => Routing,
    DriveError => Drive,
    VaultError => StorageNode,
    ApiError => Api,
}

/// Flat `(domain, value)` wire form of a return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeWire {
    /// Domain tag, see [`ErrorDomain::tag`].
    pub domain: u16,
    /// Value within the domain.
    pub value: i32,
}

impl ErrorCodeWire {
    /// The reserved success encoding.
    pub const SUCCESS: Self = Self {
        domain: GENERAL_DOMAIN_TAG,
        value: 0,
    };
}
