//! Persona side of the NFS protocol.
//!
//! A reference responder holding data and version trees in memory. It
//! answers every request an [`NfsClient`](crate::client::NfsClient) can send,
//! and is what the loopback transport delivers requests to.
//!
//! # Example
//!
//! ```rust,ignore
//! use saorsa_nfs::persona::PersonaHandler;
//!
//! let handler = PersonaHandler::in_memory();
//! let response_bytes = handler.handle_message(&request_bytes)?;
//! ```

mod handler;
mod memory;

pub use handler::PersonaHandler;
pub use memory::{MemoryStore, StorageStats};
