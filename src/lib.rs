//! # saorsa-nfs
//!
//! The client-facing message layer of the Saorsa storage network.
//!
//! This crate provides:
//! - Domain-qualified error codes and the return code carried by every
//!   response
//! - Response envelopes whose success and failure shapes are mutually
//!   exclusive, with strict decoding
//! - The version tree branch model for mutable structured data
//! - An asynchronous client whose operations resolve exactly once
//!
//! ## Architecture
//!
//! - [`nfs_protocol`]: wire types and the codec
//! - [`version_tree`]: branch model and per-name table
//! - [`client`]: `NfsClient` over a pluggable `Transport`
//! - [`persona`]: in-memory responder used by the loopback transport
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use saorsa_nfs::client::{DataChunk, LoopbackTransport, NfsClient};
//! use saorsa_nfs::persona::PersonaHandler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = Arc::new(PersonaHandler::in_memory());
//!     let client = NfsClient::with_defaults(Arc::new(LoopbackTransport::new(handler)));
//!
//!     let chunk = DataChunk::from_content(bytes::Bytes::from("hello world"));
//!     client.put(&chunk, None).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod config;
pub mod error;
pub mod nfs_protocol;
pub mod persona;
pub mod version_tree;

pub use client::{DataChunk, NetworkData, NfsClient, Operation, Transport};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use nfs_protocol::{
    error_of, is_success, Classify, ErrorCode, ErrorDomain, NfsMessage, Outcome, ProtocolError,
    ReturnCode, VersionName, NFS_PROTOCOL_ID,
};
pub use version_tree::{VersionTree, VersionTreeError, VersionTreeLimits, VersionTreeTable};
