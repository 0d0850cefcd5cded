//! Request/response messages exchanged between a client and the personas.

use serde::{Deserialize, Serialize};

use super::codec::{self, ProtocolError, WireFormat, MAX_CONTENT_SIZE};
use super::data::{
    DataName, DataNameAndContent, DataNameAndVersion, DataNameOldNewVersion, VersionName,
};
use super::envelope::{
    ContentResponse, ContentResponseWire, DataNameResponse, DataNameResponseWire, PlainResponse,
    PlainResponseWire, StructuredDataResponse, StructuredDataResponseWire, TipOfTreeResponse,
    TipOfTreeResponseWire,
};
use crate::version_tree::VersionTreeLimits;

/// Logical role a node plays for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    /// A client.
    MaidNode,
    /// Manages a client's account.
    MaidManager,
    /// Manages the holders of a chunk.
    DataManager,
    /// Manages a storage node's account.
    PmidManager,
    /// Holds chunks.
    PmidNode,
    /// Holds version trees.
    VersionHandler,
}

/// Correlated NFS message.
///
/// A response carries the `request_id` of the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfsMessage {
    /// Caller-assigned request ID.
    pub request_id: u64,
    /// Request or response body.
    pub body: NfsMessageBody,
}

/// Body of an [`NfsMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NfsMessageBody {
    /// Store data.
    PutRequest {
        /// The data to store.
        data: DataNameAndContent,
    },
    /// Response to [`NfsMessageBody::PutRequest`].
    PutResponse(DataNameResponse),
    /// Retrieve data.
    GetRequest {
        /// Name to retrieve.
        name: DataName,
    },
    /// Response to [`NfsMessageBody::GetRequest`].
    GetResponse(ContentResponse),
    /// Create a version tree.
    CreateVersionTreeRequest {
        /// Name of the versioned object.
        name: DataName,
        /// First version.
        root: VersionName,
        /// Retention and branching limits.
        limits: VersionTreeLimits,
    },
    /// Response to [`NfsMessageBody::CreateVersionTreeRequest`].
    CreateVersionTreeResponse(PlainResponse),
    /// Append a version.
    PutVersionRequest(DataNameOldNewVersion),
    /// Response to [`NfsMessageBody::PutVersionRequest`].
    PutVersionResponse(TipOfTreeResponse),
    /// Query the tips of every branch.
    GetVersionsRequest {
        /// Name of the versioned object.
        name: DataName,
    },
    /// Response to [`NfsMessageBody::GetVersionsRequest`].
    GetVersionsResponse(StructuredDataResponse),
    /// Walk one branch from its tip.
    GetBranchRequest(DataNameAndVersion),
    /// Response to [`NfsMessageBody::GetBranchRequest`].
    GetBranchResponse(StructuredDataResponse),
}

impl NfsMessageBody {
    /// Persona that serves this request, `None` for responses.
    #[must_use]
    pub const fn destination_persona(&self) -> Option<Persona> {
        match self {
            Self::PutRequest { .. } => Some(Persona::MaidManager),
            Self::GetRequest { .. } => Some(Persona::DataManager),
            Self::CreateVersionTreeRequest { .. }
            | Self::PutVersionRequest(_)
            | Self::GetVersionsRequest { .. }
            | Self::GetBranchRequest(_) => Some(Persona::VersionHandler),
            _ => None,
        }
    }

    /// Name this message is about.
    #[must_use]
    pub fn data_name(&self) -> Option<DataName> {
        match self {
            Self::PutRequest { data } => Some(data.name),
            Self::GetRequest { name }
            | Self::CreateVersionTreeRequest { name, .. }
            | Self::GetVersionsRequest { name } => Some(*name),
            Self::PutVersionRequest(request) => Some(request.name),
            Self::GetBranchRequest(request) => Some(request.name),
            Self::PutResponse(response) => Some(response.name),
            Self::GetResponse(response) => Some(response.name),
            Self::CreateVersionTreeResponse(_)
            | Self::PutVersionResponse(_)
            | Self::GetVersionsResponse(_)
            | Self::GetBranchResponse(_) => None,
        }
    }

    /// Whether routing may answer this request from a cache.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        match self {
            Self::GetRequest { name } => name.tag.is_cacheable(),
            _ => false,
        }
    }
}

impl NfsMessage {
    /// Create a message with a fresh random request ID.
    #[must_use]
    pub fn new(body: NfsMessageBody) -> Self {
        Self {
            request_id: rand::random(),
            body,
        }
    }

    /// Build the response to this message.
    #[must_use]
    pub fn reply(&self, body: NfsMessageBody) -> Self {
        Self {
            request_id: self.request_id,
            body,
        }
    }

    /// Encode the message to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ContentTooLarge`] if a put carries more than
    /// [`MAX_CONTENT_SIZE`] bytes, or an error if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        if let NfsMessageBody::PutRequest { data } = &self.body {
            if data.content.len() > MAX_CONTENT_SIZE {
                return Err(ProtocolError::ContentTooLarge {
                    size: data.content.len(),
                    max_size: MAX_CONTENT_SIZE,
                });
            }
        }
        codec::encode(&self.to_wire())
    }

    /// Decode a message from bytes.
    ///
    /// Nested envelopes are validated exactly as their standalone decoders
    /// validate them, so an unknown error domain in a response still surfaces
    /// as [`ProtocolError::UnknownErrorDomain`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are malformed, exceed the size limit, or
    /// contain an invalid envelope.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        Self::from_wire(codec::decode(data)?)
    }
}

/// Wire form of [`NfsMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfsMessageWire {
    /// Caller-assigned request ID.
    pub request_id: u64,
    /// Request or response body.
    pub body: NfsMessageBodyWire,
}

/// Wire form of [`NfsMessageBody`]. Responses hold the flat envelope wire
/// structs, validated on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NfsMessageBodyWire {
    /// See [`NfsMessageBody::PutRequest`].
    PutRequest {
        /// The data to store.
        data: DataNameAndContent,
    },
    /// See [`NfsMessageBody::PutResponse`].
    PutResponse(DataNameResponseWire),
    /// See [`NfsMessageBody::GetRequest`].
    GetRequest {
        /// Name to retrieve.
        name: DataName,
    },
    /// See [`NfsMessageBody::GetResponse`].
    GetResponse(ContentResponseWire),
    /// See [`NfsMessageBody::CreateVersionTreeRequest`].
    CreateVersionTreeRequest {
        /// Name of the versioned object.
        name: DataName,
        /// First version.
        root: VersionName,
        /// Retention and branching limits.
        limits: VersionTreeLimits,
    },
    /// See [`NfsMessageBody::CreateVersionTreeResponse`].
    CreateVersionTreeResponse(PlainResponseWire),
    /// See [`NfsMessageBody::PutVersionRequest`].
    PutVersionRequest(DataNameOldNewVersion),
    /// See [`NfsMessageBody::PutVersionResponse`].
    PutVersionResponse(TipOfTreeResponseWire),
    /// See [`NfsMessageBody::GetVersionsRequest`].
    GetVersionsRequest {
        /// Name of the versioned object.
        name: DataName,
    },
    /// See [`NfsMessageBody::GetVersionsResponse`].
    GetVersionsResponse(StructuredDataResponseWire),
    /// See [`NfsMessageBody::GetBranchRequest`].
    GetBranchRequest(DataNameAndVersion),
    /// See [`NfsMessageBody::GetBranchResponse`].
    GetBranchResponse(StructuredDataResponseWire),
}

impl WireFormat for NfsMessage {
    type Wire = NfsMessageWire;

    fn to_wire(&self) -> NfsMessageWire {
        use NfsMessageBody as B;
        use NfsMessageBodyWire as W;

        let body = match &self.body {
            B::PutRequest { data } => W::PutRequest { data: data.clone() },
            B::PutResponse(response) => W::PutResponse(response.to_wire()),
            B::GetRequest { name } => W::GetRequest { name: *name },
            B::GetResponse(response) => W::GetResponse(response.to_wire()),
            B::CreateVersionTreeRequest { name, root, limits } => W::CreateVersionTreeRequest {
                name: *name,
                root: *root,
                limits: *limits,
            },
            B::CreateVersionTreeResponse(response) => {
                W::CreateVersionTreeResponse(response.to_wire())
            }
            B::PutVersionRequest(request) => W::PutVersionRequest(*request),
            B::PutVersionResponse(response) => W::PutVersionResponse(response.to_wire()),
            B::GetVersionsRequest { name } => W::GetVersionsRequest { name: *name },
            B::GetVersionsResponse(response) => W::GetVersionsResponse(response.to_wire()),
            B::GetBranchRequest(request) => W::GetBranchRequest(*request),
            B::GetBranchResponse(response) => W::GetBranchResponse(response.to_wire()),
        };
        NfsMessageWire {
            request_id: self.request_id,
            body,
        }
    }

    fn from_wire(wire: NfsMessageWire) -> Result<Self, ProtocolError> {
        use NfsMessageBody as B;
        use NfsMessageBodyWire as W;

        let body = match wire.body {
            W::PutRequest { data } => B::PutRequest { data },
            W::PutResponse(response) => B::PutResponse(DataNameResponse::from_wire(response)?),
            W::GetRequest { name } => B::GetRequest { name },
            W::GetResponse(response) => B::GetResponse(ContentResponse::from_wire(response)?),
            W::CreateVersionTreeRequest { name, root, limits } => {
                B::CreateVersionTreeRequest { name, root, limits }
            }
            W::CreateVersionTreeResponse(response) => {
                B::CreateVersionTreeResponse(PlainResponse::from_wire(response)?)
            }
            W::PutVersionRequest(request) => B::PutVersionRequest(request),
            W::PutVersionResponse(response) => {
                B::PutVersionResponse(TipOfTreeResponse::from_wire(response)?)
            }
            W::GetVersionsRequest { name } => B::GetVersionsRequest { name },
            W::GetVersionsResponse(response) => {
                B::GetVersionsResponse(StructuredDataResponse::from_wire(response)?)
            }
            W::GetBranchRequest(request) => B::GetBranchRequest(request),
            W::GetBranchResponse(response) => {
                B::GetBranchResponse(StructuredDataResponse::from_wire(response)?)
            }
        };
        Ok(Self {
            request_id: wire.request_id,
            body,
        })
    }
}
