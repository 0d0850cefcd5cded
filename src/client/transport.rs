//! The seam between the client and the network.

use std::sync::Arc;

use crate::error::Result;
use crate::nfs_protocol::{Persona, XorName};

/// Where a request is routed: the group of nodes playing `persona` closest to
/// `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Persona that serves the request.
    pub persona: Persona,
    /// Network address the request is routed to.
    pub name: XorName,
}

/// Called with the raw bytes of each response.
///
/// A group of nodes may answer one request, so the callback can run more
/// than once and from any thread.
pub type ResponseCallback = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Message delivery to persona groups.
pub trait Transport: Send + Sync + 'static {
    /// Send an encoded request.
    ///
    /// `cacheable` tells routing it may answer from a cache. Responses are
    /// delivered through `on_response`, never from within this call's return
    /// value.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be handed to the network.
    fn send(
        &self,
        destination: Destination,
        message: Vec<u8>,
        cacheable: bool,
        on_response: ResponseCallback,
    ) -> Result<()>;
}
