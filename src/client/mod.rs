//! NFS client module for saorsa-nfs.
//!
//! This module provides the asynchronous operation layer on top of the
//! message types in [`crate::nfs_protocol`].
//!
//! # Architecture
//!
//! The client provides:
//!
//! 1. **Eager operations**: every call sends its request immediately and
//!    returns an [`Operation`] future
//! 2. **Single resolution**: response, timeout and cancellation race, and
//!    the first to fire settles the operation
//! 3. **Pluggable transport**: requests leave through the [`Transport`] trait
//!
//! # Data Types
//!
//! - **Chunk**: Immutable content-addressed data (hash(value) == key)
//! - **Version trees**: Branching histories of mutable structured data
//!
//! # Example
//!
//! ```rust,ignore
//! use saorsa_nfs::client::{DataChunk, LoopbackTransport, NfsClient};
//! use saorsa_nfs::persona::PersonaHandler;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(LoopbackTransport::new(Arc::new(PersonaHandler::in_memory())));
//!     let client = NfsClient::with_defaults(transport);
//!
//!     let chunk = DataChunk::from_content(bytes::Bytes::from("hello world"));
//!     client.put(&chunk, None).await?;
//!
//!     let fetched = client.get::<DataChunk>(&chunk.address, None).await?;
//!     assert_eq!(fetched, chunk);
//!     Ok(())
//! }
//! ```

mod data_types;
mod loopback;
mod nfs_client;
mod pending;
mod transport;

pub use data_types::{DataChunk, NetworkData};
pub use loopback::LoopbackTransport;
pub use nfs_client::NfsClient;
pub use pending::Operation;
pub use transport::{Destination, ResponseCallback, Transport};
