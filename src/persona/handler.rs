//! Request handler answering NFS requests the way the network's persona
//! groups do.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    PersonaHandler                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  protocol_id() = "saorsa/nfs/v1"                        │
//! │                                                         │
//! │  handle_message(data) ──▶ decode NfsMessage             │
//! │                                   │                     │
//! │         ┌─────────────────────────┼─────────────────┐   │
//! │         ▼                         ▼                 ▼   │
//! │    PutRequest               GetRequest      version requests
//! │         │                         │                 │   │
//! │         ▼                         ▼                 ▼   │
//! │    MemoryStore               MemoryStore   VersionTreeTable
//! │         │                         │                 │   │
//! │         └─────────────────────────┴─────────────────┘   │
//! │                           │                             │
//! │                 return Ok(response_bytes)               │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use super::memory::MemoryStore;
use crate::error::{Error, Result};
use crate::nfs_protocol::{
    compute_address, ContentResponse, DataName, DataNameAndContent, DataNameAndVersion,
    DataNameOldNewVersion, DataNameResponse, DataTagValue, NfsMessage, NfsMessageBody,
    PlainResponse, ProtocolError, StructuredData, StructuredDataResponse, TipOfTreeResponse,
    VaultError, VersionName, MAX_CONTENT_SIZE, NFS_PROTOCOL_ID,
};
use crate::version_tree::{VersionTreeLimits, VersionTreeTable};

/// NFS request handler.
///
/// Serves data requests from a [`MemoryStore`] and version requests from a
/// [`VersionTreeTable`]. Failures are reported inside the response envelope;
/// only undecodable input fails the call itself.
pub struct PersonaHandler {
    /// Stored data.
    store: Arc<MemoryStore>,
    /// Version trees.
    version_trees: Arc<VersionTreeTable>,
}

impl PersonaHandler {
    /// Create a new handler.
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, version_trees: Arc<VersionTreeTable>) -> Self {
        info!("NFS persona handler initialized (protocol={NFS_PROTOCOL_ID})");
        Self {
            store,
            version_trees,
        }
    }

    /// Create a handler with empty state.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(VersionTreeTable::new()),
        )
    }

    /// Get the protocol identifier.
    #[must_use]
    pub fn protocol_id(&self) -> &'static str {
        NFS_PROTOCOL_ID
    }

    /// The data store.
    #[must_use]
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// The version tree table.
    #[must_use]
    pub fn version_trees(&self) -> &Arc<VersionTreeTable> {
        &self.version_trees
    }

    /// Handle an incoming request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be decoded, is a response, or
    /// the reply cannot be encoded.
    pub fn handle_message(&self, data: &[u8]) -> Result<Bytes> {
        let message = NfsMessage::decode(data)?;

        let body = match message.body {
            NfsMessageBody::PutRequest { ref data } => {
                NfsMessageBody::PutResponse(self.handle_put(data))
            }
            NfsMessageBody::GetRequest { name } => {
                NfsMessageBody::GetResponse(self.handle_get(name))
            }
            NfsMessageBody::CreateVersionTreeRequest { name, root, limits } => {
                NfsMessageBody::CreateVersionTreeResponse(
                    self.handle_create_version_tree(name, root, limits),
                )
            }
            NfsMessageBody::PutVersionRequest(request) => {
                NfsMessageBody::PutVersionResponse(self.handle_put_version(&request))
            }
            NfsMessageBody::GetVersionsRequest { name } => {
                NfsMessageBody::GetVersionsResponse(self.handle_get_versions(name))
            }
            NfsMessageBody::GetBranchRequest(request) => {
                NfsMessageBody::GetBranchResponse(self.handle_get_branch(&request))
            }
            // Response messages shouldn't be received as requests
            NfsMessageBody::PutResponse(_)
            | NfsMessageBody::GetResponse(_)
            | NfsMessageBody::CreateVersionTreeResponse(_)
            | NfsMessageBody::PutVersionResponse(_)
            | NfsMessageBody::GetVersionsResponse(_)
            | NfsMessageBody::GetBranchResponse(_) => {
                warn!("Received response {:016x} as a request", message.request_id);
                return Err(Error::Protocol(ProtocolError::UnexpectedMessage(
                    "response received as a request".to_string(),
                )));
            }
        };

        message.reply(body).encode().map(Bytes::from).map_err(Error::from)
    }

    /// Handle a PUT request.
    fn handle_put(&self, data: &DataNameAndContent) -> DataNameResponse {
        let name = data.name;
        debug!("Handling PUT request for {name}");

        // 1. Validate size
        if data.content.len() > MAX_CONTENT_SIZE {
            return DataNameResponse::with_code(name, VaultError::DataTooLarge);
        }

        // 2. Immutable data must hash to its name
        if name.tag == DataTagValue::ImmutableData
            && compute_address(data.content.as_bytes()) != name.raw_name
        {
            warn!("Rejected PUT for {name}: content does not match name");
            return DataNameResponse::with_code(name, VaultError::InvalidContent);
        }

        // 3. Store; a duplicate immutable write is an idempotent success
        self.store.put(name, data.content.0.clone());
        DataNameResponse::new(name)
    }

    /// Handle a GET request.
    fn handle_get(&self, name: DataName) -> ContentResponse {
        debug!("Handling GET request for {name}");
        match self.store.get(&name) {
            Some(content) => ContentResponse::from_content(name, content.into()),
            None => ContentResponse::from_error(name, VaultError::NoSuchData),
        }
    }

    fn handle_create_version_tree(
        &self,
        name: DataName,
        root: VersionName,
        limits: VersionTreeLimits,
    ) -> PlainResponse {
        match self.version_trees.create_version_tree(name, root, limits) {
            Ok(()) => PlainResponse::new(),
            Err(e) => {
                debug!("Create version tree {name} failed: {e}");
                PlainResponse::from_error(e)
            }
        }
    }

    fn handle_put_version(&self, request: &DataNameOldNewVersion) -> TipOfTreeResponse {
        match self.version_trees.put_version(
            &request.name,
            &request.old_version,
            request.new_version,
        ) {
            Ok(tip) => TipOfTreeResponse::new(Some(tip)),
            Err(e) => {
                debug!("Put version on {} failed: {e}", request.name);
                TipOfTreeResponse::from_error(e)
            }
        }
    }

    fn handle_get_versions(&self, name: DataName) -> StructuredDataResponse {
        match self.version_trees.get_versions(&name) {
            Ok(tips) => StructuredDataResponse::from_structured(StructuredData::new(tips)),
            Err(e) => StructuredDataResponse::from_error(name, e),
        }
    }

    fn handle_get_branch(&self, request: &DataNameAndVersion) -> StructuredDataResponse {
        match self
            .version_trees
            .get_branch(&request.name, &request.version)
        {
            Ok(branch) => StructuredDataResponse::from_structured(StructuredData::new(branch)),
            Err(e) => StructuredDataResponse::from_error(request.name, e),
        }
    }
}
