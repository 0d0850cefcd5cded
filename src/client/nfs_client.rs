//! Asynchronous NFS operations against the storage network.
//!
//! Each call sends its request straight away and returns an [`Operation`]
//! that resolves exactly once: with the first response that answers it, with
//! a timeout error when its timer fires first, or with a cancellation error
//! when the client is stopped first.
//!
//! ```text
//!   put / get / put_version ...
//!             │
//!             ▼
//!   register Completion ──▶ spawn timer ──▶ Transport::send
//!             ▲                  │                 │
//!             │                  ▼                 ▼
//!          stop() ──────────▶ settle ◀──── response callback
//!                                │
//!                                ▼
//!                        Operation resolves
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::data_types::NetworkData;
use super::pending::{timed_out, Operation, PendingOperations};
use super::transport::{Destination, ResponseCallback, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::nfs_protocol::{
    Classify, DataName, DataNameAndContent, DataNameAndVersion, DataNameOldNewVersion,
    ErrorCode, NfsMessage, NfsMessageBody, Outcome, ProtocolError, VersionName, XorName,
};
use crate::version_tree::{VersionTreeError, VersionTreeLimits};

/// Client for NFS operations.
///
/// Safe to share between tasks: operations run concurrently and each is
/// correlated with its response by request ID.
pub struct NfsClient<T: Transport> {
    transport: Arc<T>,
    config: ClientConfig,
    pending: Arc<PendingOperations>,
}

impl<T: Transport> NfsClient<T> {
    /// Create a new client over `transport`.
    #[must_use]
    pub fn new(transport: Arc<T>, config: ClientConfig) -> Self {
        debug!("Creating NFS client (timeout={}s)", config.timeout_secs);
        Self {
            transport,
            config,
            pending: Arc::new(PendingOperations::default()),
        }
    }

    /// Create a client with default configuration.
    #[must_use]
    pub fn with_defaults(transport: Arc<T>) -> Self {
        Self::new(transport, ClientConfig::default())
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of operations still waiting for an outcome.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.pending.is_stopped()
    }

    /// Cancel every pending operation. Operations started afterwards resolve
    /// as cancelled without being sent.
    ///
    /// Returns the number of operations cancelled.
    pub fn stop(&self) -> usize {
        let cancelled = self.pending.stop();
        debug!("NFS client stopped, cancelled {cancelled} pending operations");
        cancelled
    }

    /// Store `data`.
    pub fn put<D: NetworkData>(&self, data: &D, timeout: Option<Duration>) -> Operation<()> {
        let name = data.data_name();
        let body = NfsMessageBody::PutRequest {
            data: DataNameAndContent {
                name,
                content: data.to_content(),
            },
        };
        self.dispatch(body, timeout, move |response| match response {
            NfsMessageBody::PutResponse(response) if response.name == name => {
                Some(match response.outcome() {
                    Outcome::Success(_) => Ok(()),
                    Outcome::Failure(code) => Err(Error::Code(code)),
                })
            }
            _ => None,
        })
    }

    /// Fetch the value of kind `D` stored at `name`.
    pub fn get<D: NetworkData>(&self, name: &XorName, timeout: Option<Duration>) -> Operation<D> {
        let name = DataName::new(D::TAG, *name);
        let body = NfsMessageBody::GetRequest { name };
        self.dispatch(body, timeout, move |response| match response {
            NfsMessageBody::GetResponse(response) if response.name == name => {
                Some(match response.outcome() {
                    Outcome::Success(content) => {
                        D::from_network(&name, content.clone()).map_err(Error::from)
                    }
                    Outcome::Failure(code) => Err(Error::Code(code)),
                })
            }
            _ => None,
        })
    }

    /// Create the version tree for `name`, starting at `root`.
    ///
    /// Without explicit `limits` the configured defaults apply. Zero limits
    /// fail locally with [`VersionTreeError::InvalidArgument`].
    pub fn create_version_tree(
        &self,
        name: DataName,
        root: VersionName,
        limits: Option<VersionTreeLimits>,
        timeout: Option<Duration>,
    ) -> Operation<()> {
        let limits = limits.unwrap_or(self.config.version_tree);
        if let Err(e) = limits.validate() {
            return self.resolved(Err(e.into()));
        }
        let body = NfsMessageBody::CreateVersionTreeRequest { name, root, limits };
        self.dispatch(body, timeout, |response| match response {
            NfsMessageBody::CreateVersionTreeResponse(response) => {
                Some(response.outcome().into_result().map(|_| ()).map_err(tree_error))
            }
            _ => None,
        })
    }

    /// Append `new` after `old` in the version tree for `name`. Resolves with
    /// the new tip.
    pub fn put_version(
        &self,
        name: DataName,
        old: VersionName,
        new: VersionName,
        timeout: Option<Duration>,
    ) -> Operation<VersionName> {
        let body = NfsMessageBody::PutVersionRequest(DataNameOldNewVersion {
            name,
            old_version: old,
            new_version: new,
        });
        self.dispatch(body, timeout, |response| match response {
            NfsMessageBody::PutVersionResponse(response) => Some(match response.outcome() {
                Outcome::Success(response) => response.tip.ok_or_else(|| {
                    Error::from(ProtocolError::UnexpectedMessage(
                        "put version response without a tip".into(),
                    ))
                }),
                Outcome::Failure(code) => Err(tree_error(code)),
            }),
            _ => None,
        })
    }

    /// Tips of every branch of the version tree for `name`, in branch
    /// creation order.
    pub fn get_versions(
        &self,
        name: DataName,
        timeout: Option<Duration>,
    ) -> Operation<Vec<VersionName>> {
        let body = NfsMessageBody::GetVersionsRequest { name };
        self.dispatch(body, timeout, |response| match response {
            NfsMessageBody::GetVersionsResponse(response) => Some(
                response
                    .outcome()
                    .into_result()
                    .map(|structured| structured.versions.clone())
                    .map_err(tree_error),
            ),
            _ => None,
        })
    }

    /// The branch of the version tree for `name` ending at `tip`, newest
    /// first.
    pub fn get_branch(
        &self,
        name: DataName,
        tip: VersionName,
        timeout: Option<Duration>,
    ) -> Operation<Vec<VersionName>> {
        let body = NfsMessageBody::GetBranchRequest(DataNameAndVersion { name, version: tip });
        self.dispatch(body, timeout, |response| match response {
            NfsMessageBody::GetBranchResponse(response) => Some(
                response
                    .outcome()
                    .into_result()
                    .map(|structured| structured.versions.clone())
                    .map_err(tree_error),
            ),
            _ => None,
        })
    }

    /// An operation that is already resolved.
    fn resolved<R: Send + 'static>(&self, result: Result<R>) -> Operation<R> {
        let (completion, operation) = self.pending.register();
        completion.settle(result);
        operation
    }

    /// Send `body` and settle the returned operation from whichever trigger
    /// fires first.
    ///
    /// `handle_response` maps a correlated response body to the outcome, or
    /// `None` if the body does not answer this request.
    fn dispatch<R, F>(
        &self,
        body: NfsMessageBody,
        timeout: Option<Duration>,
        handle_response: F,
    ) -> Operation<R>
    where
        R: Send + 'static,
        F: Fn(NfsMessageBody) -> Option<Result<R>> + Send + Sync + 'static,
    {
        let (completion, operation) = self.pending.register::<R>();
        if completion.is_settled() {
            return operation;
        }

        let (Some(persona), Some(name)) = (body.destination_persona(), body.data_name()) else {
            completion.settle(Err(ProtocolError::UnexpectedMessage(
                "only requests can be sent".into(),
            )
            .into()));
            return operation;
        };
        let destination = Destination {
            persona,
            name: name.raw_name,
        };
        let cacheable = body.is_cacheable();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                completion.settle(Err(Error::Network(format!("no async runtime: {e}"))));
                return operation;
            }
        };

        let message = NfsMessage::new(body);
        let request_id = message.request_id;
        let bytes = match message.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                completion.settle(Err(e.into()));
                return operation;
            }
        };

        let timeout = timeout.unwrap_or_else(|| self.config.timeout());
        let timer_completion = Arc::clone(&completion);
        let timer = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if timer_completion.settle(Err(timed_out())) {
                debug!(
                    "Request {request_id:016x} timed out after {}ms",
                    timeout.as_millis()
                );
            }
        });
        completion.set_timer(timer.abort_handle());

        let response_completion = Arc::clone(&completion);
        let on_response: ResponseCallback = Arc::new(move |data: Vec<u8>| {
            if response_completion.is_settled() {
                trace!("Discarding late response to request {request_id:016x}");
                return;
            }
            let response = match NfsMessage::decode(&data) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Failed to decode response to request {request_id:016x}: {e}");
                    response_completion.settle(Err(e.into()));
                    return;
                }
            };
            if response.request_id != request_id {
                trace!(
                    "Discarding response for request {:016x} while waiting for {request_id:016x}",
                    response.request_id
                );
                return;
            }
            match handle_response(response.body) {
                Some(result) => {
                    response_completion.settle(result);
                }
                None => trace!("Discarding non-matching response to request {request_id:016x}"),
            }
        });

        debug!(
            "Sending request {request_id:016x} to {:?} at {} ({} bytes)",
            destination.persona,
            hex::encode(destination.name),
            bytes.len()
        );
        if let Err(e) = self
            .transport
            .send(destination, bytes, cacheable, on_response)
        {
            warn!("Failed to send request {request_id:016x}: {e}");
            completion.settle(Err(e));
        }

        operation
    }
}

impl<T: Transport> Drop for NfsClient<T> {
    fn drop(&mut self) {
        self.pending.stop();
    }
}

/// Map a failure reported for a version tree request back to the tree error
/// a local caller would see.
fn tree_error(code: ErrorCode) -> Error {
    VersionTreeError::from_error_code(code).map_or(Error::Code(code), Error::VersionTree)
}
