//! Response envelopes.
//!
//! Each response carries a [`ReturnCode`] and zero or more payload fields.
//! Shapes that hold *either* a success value *or* a failure are sum types in
//! memory, so an ambiguous value cannot be built. Their flat wire structs
//! still carry optional fields, and decoding rejects any combination that
//! does not map to exactly one variant.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::codec::{serde_via_wire, ProtocolError, WireFormat};
use super::data::{
    Content, DataAndPmidHint, DataName, DataNameAndContent, DataNameAndVersion,
    DataNameOldNewVersion, PmidHealth, PmidRegistration, StructuredData, VersionName,
};
use super::error_code::{ErrorCode, ErrorCodeWire};
use super::outcome::{Classify, Outcome};
use super::return_code::ReturnCode;

fn shape_violation(reason: &str) -> ProtocolError {
    ProtocolError::DeserializationFailed(reason.to_string())
}

/// Declare a `payload + ReturnCode` envelope together with its wire struct.
///
/// These shapes have no exclusivity invariant: the payload is always present
/// and the code says whether the operation that produced it succeeded.
macro_rules! coded_envelope {
    (
        $(#[$meta:meta])*
        $name:ident / $wire:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
            /// Outcome reported by the peer.
            pub return_code: ReturnCode,
        }

        #[doc = concat!("Wire form of [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $wire {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
            /// Domain-qualified return code.
            pub return_code: ErrorCodeWire,
        }

        impl $name {
            /// Build a successful envelope.
            #[must_use]
            pub fn new($($field: $ty),*) -> Self {
                Self {
                    $($field,)*
                    return_code: ReturnCode::Success,
                }
            }

            /// Build an envelope with an explicit return code.
            #[must_use]
            pub fn with_code($($field: $ty,)* return_code: impl Into<ReturnCode>) -> Self {
                Self {
                    $($field,)*
                    return_code: return_code.into(),
                }
            }

            /// Build a failed envelope with every payload field left empty.
            #[must_use]
            pub fn from_error(error: impl Into<ErrorCode>) -> Self {
                Self {
                    return_code: ReturnCode::Failure(error.into()),
                    ..Self::default()
                }
            }
        }

        impl WireFormat for $name {
            type Wire = $wire;

            fn to_wire(&self) -> $wire {
                $wire {
                    $($field: self.$field.clone(),)*
                    return_code: self.return_code.to_wire(),
                }
            }

            fn from_wire(wire: $wire) -> Result<Self, ProtocolError> {
                Ok(Self {
                    $($field: wire.$field,)*
                    return_code: ReturnCode::from_wire(wire.return_code)?,
                })
            }
        }

        serde_via_wire!($name);

        impl Classify for $name {
            type Payload = Self;

            fn outcome(&self) -> Outcome<&Self> {
                match self.return_code {
                    ReturnCode::Success => Outcome::Success(self),
                    ReturnCode::Failure(code) => Outcome::Failure(code),
                }
            }
        }
    };
}

coded_envelope! {
    /// Outcome of an operation with no success payload, such as account or
    /// version tree creation.
    PlainResponse / PlainResponseWire {}
}

coded_envelope! {
    /// Outcome of an operation on one named object.
    DataNameResponse / DataNameResponseWire {
        /// Name the operation targeted.
        name: DataName,
    }
}

coded_envelope! {
    /// Outcome of a store, with the space left on the account.
    DataNameAndSpaceResponse / DataNameAndSpaceResponseWire {
        /// Name the operation targeted.
        name: DataName,
        /// Remaining space in bytes; negative once over quota.
        available_space: i64,
    }
}

coded_envelope! {
    /// Available space on an account or node.
    AvailableSizeResponse / AvailableSizeResponseWire {
        /// Size in bytes.
        available_size: u64,
    }
}

coded_envelope! {
    /// Health report of a storage node.
    PmidHealthResponse / PmidHealthResponseWire {
        /// The report.
        pmid_health: PmidHealth,
    }
}

coded_envelope! {
    /// Outcome of a storage node (de)registration.
    PmidRegistrationResponse / PmidRegistrationResponseWire {
        /// The registration.
        pmid_registration: PmidRegistration,
    }
}

coded_envelope! {
    /// Outcome of a version put, carrying the tip of the extended branch.
    TipOfTreeResponse / TipOfTreeResponseWire {
        /// New tip, absent on failure.
        tip: Option<VersionName>,
    }
}

coded_envelope! {
    /// Outcome of an operation on one version of a named object.
    DataNameVersionResponse / DataNameVersionResponseWire {
        /// Name and version.
        data_name_and_version: DataNameAndVersion,
    }
}

coded_envelope! {
    /// Outcome of a version put, echoing the request.
    DataNameOldNewVersionResponse / DataNameOldNewVersionResponseWire {
        /// Name with old and new version.
        data_name_old_new_version: DataNameOldNewVersion,
    }
}

coded_envelope! {
    /// Data returned together with a return code.
    DataResponse / DataResponseWire {
        /// The data.
        data: DataNameAndContent,
    }
}

coded_envelope! {
    /// Data with the storage node expected to hold it.
    DataPmidHintResponse / DataPmidHintResponseWire {
        /// Data and hint.
        data_and_pmid_hint: DataAndPmidHint,
    }
}

// =============================================================================
// Named set
// =============================================================================

/// One return code shared by a set of names.
///
/// The set is keyed by name; insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataNamesResponse {
    /// Names the operation covered.
    pub names: BTreeSet<DataName>,
    /// Outcome reported by the peer.
    pub return_code: ReturnCode,
}

/// Wire form of [`DataNamesResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNamesResponseWire {
    /// Names in ascending order.
    pub names: Vec<DataName>,
    /// Domain-qualified return code.
    pub return_code: ErrorCodeWire,
}

impl DataNamesResponse {
    /// An empty set with the given code.
    #[must_use]
    pub fn new(return_code: impl Into<ReturnCode>) -> Self {
        Self {
            names: BTreeSet::new(),
            return_code: return_code.into(),
        }
    }

    /// A set built from `names`; duplicates collapse.
    #[must_use]
    pub fn with_names(
        names: impl IntoIterator<Item = DataName>,
        return_code: impl Into<ReturnCode>,
    ) -> Self {
        Self {
            names: names.into_iter().collect(),
            return_code: return_code.into(),
        }
    }

    /// An empty set carrying `error`.
    #[must_use]
    pub fn from_error(error: impl Into<ErrorCode>) -> Self {
        Self::new(ReturnCode::Failure(error.into()))
    }

    /// Add a name. Returns `false` if it was already present.
    pub fn add_data_name(&mut self, name: DataName) -> bool {
        self.names.insert(name)
    }
}

impl WireFormat for DataNamesResponse {
    type Wire = DataNamesResponseWire;

    fn to_wire(&self) -> DataNamesResponseWire {
        DataNamesResponseWire {
            names: self.names.iter().copied().collect(),
            return_code: self.return_code.to_wire(),
        }
    }

    fn from_wire(wire: DataNamesResponseWire) -> Result<Self, ProtocolError> {
        let count = wire.names.len();
        let names: BTreeSet<DataName> = wire.names.into_iter().collect();
        if names.len() != count {
            return Err(shape_violation("duplicate name in name set"));
        }
        Ok(Self {
            names,
            return_code: ReturnCode::from_wire(wire.return_code)?,
        })
    }
}

serde_via_wire!(DataNamesResponse);

impl Classify for DataNamesResponse {
    type Payload = BTreeSet<DataName>;

    fn outcome(&self) -> Outcome<&BTreeSet<DataName>> {
        match self.return_code {
            ReturnCode::Success => Outcome::Success(&self.names),
            ReturnCode::Failure(code) => Outcome::Failure(code),
        }
    }
}

// =============================================================================
// Content or failure
// =============================================================================

/// Either retrieved content or the reason it could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOrError {
    /// The content.
    Content(Content),
    /// The failure.
    Error(ErrorCode),
}

/// Response to a get: content XOR a failure, correlated by name.
///
/// Two responses are equal when their names match and they carry equal
/// content, or equal failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResponse {
    /// Name that was requested.
    pub name: DataName,
    /// Content or failure.
    pub body: ContentOrError,
}

/// Wire form of [`ContentResponse`]. Exactly one of `content` and
/// `return_code` is present, and a present code is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentResponseWire {
    /// Name that was requested.
    pub name: DataName,
    /// Content on success.
    pub content: Option<Content>,
    /// Failure code.
    pub return_code: Option<ErrorCodeWire>,
}

impl ContentResponse {
    /// A successful response.
    #[must_use]
    pub fn from_content(name: DataName, content: Content) -> Self {
        Self {
            name,
            body: ContentOrError::Content(content),
        }
    }

    /// A failed response.
    #[must_use]
    pub fn from_error(name: DataName, error: impl Into<ErrorCode>) -> Self {
        Self {
            name,
            body: ContentOrError::Error(error.into()),
        }
    }

    /// Build from separately held content and code.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidEnvelope`] unless exactly one of
    /// `content` and a failure `return_code` is given.
    pub fn new(
        name: DataName,
        content: Option<Content>,
        return_code: ReturnCode,
    ) -> Result<Self, ProtocolError> {
        match (content, return_code) {
            (Some(content), ReturnCode::Success) => Ok(Self::from_content(name, content)),
            (None, ReturnCode::Failure(code)) => Ok(Self::from_error(name, code)),
            (Some(_), ReturnCode::Failure(_)) => Err(ProtocolError::InvalidEnvelope(
                "content and failure code are mutually exclusive".to_string(),
            )),
            (None, ReturnCode::Success) => Err(ProtocolError::InvalidEnvelope(
                "content response needs content or a failure code".to_string(),
            )),
        }
    }

    /// The content, if retrieval succeeded.
    #[must_use]
    pub fn content(&self) -> Option<&Content> {
        match &self.body {
            ContentOrError::Content(content) => Some(content),
            ContentOrError::Error(_) => None,
        }
    }

    /// Return code equivalent of the body.
    #[must_use]
    pub fn return_code(&self) -> ReturnCode {
        match &self.body {
            ContentOrError::Content(_) => ReturnCode::Success,
            ContentOrError::Error(code) => ReturnCode::Failure(*code),
        }
    }
}

impl TryFrom<DataNameResponse> for ContentResponse {
    type Error = ProtocolError;

    /// Turn a failed name response into a failed content response.
    fn try_from(response: DataNameResponse) -> Result<Self, ProtocolError> {
        match response.return_code {
            ReturnCode::Failure(code) => Ok(Self::from_error(response.name, code)),
            ReturnCode::Success => Err(ProtocolError::InvalidEnvelope(
                "a successful name response carries no content".to_string(),
            )),
        }
    }
}

impl WireFormat for ContentResponse {
    type Wire = ContentResponseWire;

    fn to_wire(&self) -> ContentResponseWire {
        let (content, return_code) = match &self.body {
            ContentOrError::Content(content) => (Some(content.clone()), None),
            ContentOrError::Error(code) => (None, Some(code.to_wire())),
        };
        ContentResponseWire {
            name: self.name,
            content,
            return_code,
        }
    }

    fn from_wire(wire: ContentResponseWire) -> Result<Self, ProtocolError> {
        match (wire.content, wire.return_code) {
            (Some(content), None) => Ok(Self::from_content(wire.name, content)),
            (None, Some(code)) => match ReturnCode::from_wire(code)? {
                ReturnCode::Failure(code) => Ok(Self::from_error(wire.name, code)),
                ReturnCode::Success => Err(shape_violation(
                    "content response without content carries a success code",
                )),
            },
            (Some(_), Some(_)) => Err(shape_violation(
                "content response carries both content and a return code",
            )),
            (None, None) => Err(shape_violation(
                "content response carries neither content nor a return code",
            )),
        }
    }
}

serde_via_wire!(ContentResponse);

impl Classify for ContentResponse {
    type Payload = Content;

    fn outcome(&self) -> Outcome<&Content> {
        match &self.body {
            ContentOrError::Content(content) => Outcome::Success(content),
            ContentOrError::Error(code) => Outcome::Failure(*code),
        }
    }
}

// =============================================================================
// Structured data or failure
// =============================================================================

/// Response to a version query: the versions XOR a name with the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredDataResponse {
    /// The requested versions.
    Structured(StructuredData),
    /// The query on `name` failed.
    Failed {
        /// Name of the versioned object.
        name: DataName,
        /// Why the query failed.
        code: ErrorCode,
    },
}

/// Wire form of [`StructuredDataResponse`]. `structured` and `name` are
/// mutually exclusive and one of them must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDataResponseWire {
    /// Versions on success.
    pub structured: Option<StructuredData>,
    /// Name on failure.
    pub name: Option<DataName>,
    /// Return code; success alongside `structured`.
    pub return_code: ErrorCodeWire,
}

impl StructuredDataResponse {
    /// A successful response.
    #[must_use]
    pub fn from_structured(structured: StructuredData) -> Self {
        Self::Structured(structured)
    }

    /// A failed response.
    #[must_use]
    pub fn from_error(name: DataName, error: impl Into<ErrorCode>) -> Self {
        Self::Failed {
            name,
            code: error.into(),
        }
    }

    /// Build from separately held fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidEnvelope`] if both or neither of
    /// `structured` and `name` are given, if `structured` comes with a failure
    /// code, or if `name` comes with a success code.
    pub fn new(
        structured: Option<StructuredData>,
        name: Option<DataName>,
        return_code: ReturnCode,
    ) -> Result<Self, ProtocolError> {
        match (structured, name, return_code) {
            (Some(structured), None, ReturnCode::Success) => Ok(Self::Structured(structured)),
            (None, Some(name), ReturnCode::Failure(code)) => Ok(Self::Failed { name, code }),
            (Some(_), Some(_), _) => Err(ProtocolError::InvalidEnvelope(
                "structured data and name are mutually exclusive".to_string(),
            )),
            (None, None, _) => Err(ProtocolError::InvalidEnvelope(
                "structured response needs structured data or a name".to_string(),
            )),
            (Some(_), None, ReturnCode::Failure(_)) => Err(ProtocolError::InvalidEnvelope(
                "structured data cannot carry a failure code".to_string(),
            )),
            (None, Some(_), ReturnCode::Success) => Err(ProtocolError::InvalidEnvelope(
                "a name without structured data needs a failure code".to_string(),
            )),
        }
    }

    /// The versions, if the query succeeded.
    #[must_use]
    pub fn structured(&self) -> Option<&StructuredData> {
        match self {
            Self::Structured(structured) => Some(structured),
            Self::Failed { .. } => None,
        }
    }

    /// Return code equivalent of this response.
    #[must_use]
    pub fn return_code(&self) -> ReturnCode {
        match self {
            Self::Structured(_) => ReturnCode::Success,
            Self::Failed { code, .. } => ReturnCode::Failure(*code),
        }
    }
}

impl WireFormat for StructuredDataResponse {
    type Wire = StructuredDataResponseWire;

    fn to_wire(&self) -> StructuredDataResponseWire {
        match self {
            Self::Structured(structured) => StructuredDataResponseWire {
                structured: Some(structured.clone()),
                name: None,
                return_code: ErrorCodeWire::SUCCESS,
            },
            Self::Failed { name, code } => StructuredDataResponseWire {
                structured: None,
                name: Some(*name),
                return_code: code.to_wire(),
            },
        }
    }

    fn from_wire(wire: StructuredDataResponseWire) -> Result<Self, ProtocolError> {
        let return_code = ReturnCode::from_wire(wire.return_code)?;
        match (wire.structured, wire.name, return_code) {
            (Some(structured), None, ReturnCode::Success) => Ok(Self::Structured(structured)),
            (None, Some(name), ReturnCode::Failure(code)) => Ok(Self::Failed { name, code }),
            (Some(_), Some(_), _) => Err(shape_violation(
                "structured response carries both structured data and a name",
            )),
            (None, None, _) => Err(shape_violation(
                "structured response carries neither structured data nor a name",
            )),
            (Some(_), None, ReturnCode::Failure(_)) => Err(shape_violation(
                "structured data carries a failure code",
            )),
            (None, Some(_), ReturnCode::Success) => Err(shape_violation(
                "structured response name carries a success code",
            )),
        }
    }
}

serde_via_wire!(StructuredDataResponse);

impl Classify for StructuredDataResponse {
    type Payload = StructuredData;

    fn outcome(&self) -> Outcome<&StructuredData> {
        match self {
            Self::Structured(structured) => Outcome::Success(structured),
            Self::Failed { code, .. } => Outcome::Failure(*code),
        }
    }
}
