//! Test harness wiring a client to an in-memory persona handler.

use std::sync::Arc;
use std::time::Duration;

use saorsa_nfs::client::{LoopbackTransport, NfsClient};
use saorsa_nfs::persona::PersonaHandler;
use saorsa_nfs::ClientConfig;
use tracing_subscriber::EnvFilter;

/// Timeout used by harness clients unless a test overrides it.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A client, its transport and the handler behind it.
pub struct TestHarness {
    handler: Arc<PersonaHandler>,
    transport: Arc<LoopbackTransport>,
    client: NfsClient<LoopbackTransport>,
}

impl TestHarness {
    /// Harness with an immediate, single-response transport.
    #[must_use]
    pub fn setup() -> Self {
        Self::setup_with(|transport| transport)
    }

    /// Harness whose transport is adjusted by `configure`.
    #[must_use]
    pub fn setup_with(configure: impl FnOnce(LoopbackTransport) -> LoopbackTransport) -> Self {
        init_logging();
        let handler = Arc::new(PersonaHandler::in_memory());
        let transport = Arc::new(configure(LoopbackTransport::new(Arc::clone(&handler))));
        let config = ClientConfig {
            timeout_secs: TEST_TIMEOUT.as_secs(),
            ..ClientConfig::default()
        };
        let client = NfsClient::new(Arc::clone(&transport), config);
        Self {
            handler,
            transport,
            client,
        }
    }

    /// The client under test.
    #[must_use]
    pub fn client(&self) -> &NfsClient<LoopbackTransport> {
        &self.client
    }

    /// The transport between client and handler.
    #[must_use]
    pub fn transport(&self) -> &LoopbackTransport {
        &self.transport
    }

    /// The handler answering requests.
    #[must_use]
    pub fn handler(&self) -> &PersonaHandler {
        &self.handler
    }
}

/// Install a test subscriber once. `RUST_LOG` selects the verbosity.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
