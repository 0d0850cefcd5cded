//! E2E test infrastructure for saorsa-nfs.
//!
//! Every test drives a real [`NfsClient`](saorsa_nfs::NfsClient) against an
//! in-memory persona handler through the loopback transport.
//!
//! ## Architecture
//!
//! ```text
//! TestHarness
//!     ├── NfsClient
//!     │       └── LoopbackTransport (latency, group size, mute)
//!     └── PersonaHandler
//!             ├── MemoryStore
//!             └── VersionTreeTable
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! #[tokio::test]
//! async fn test_chunk_storage() {
//!     let harness = TestHarness::setup();
//!     let chunk = DataChunk::from_content(Bytes::from("test data"));
//!     harness.client().put(&chunk, None).await.unwrap();
//! }
//! ```

mod harness;

#[cfg(test)]
mod integration_tests;

#[cfg(test)]
mod version_tree;

pub use harness::TestHarness;
