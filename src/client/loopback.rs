//! In-process transport delivering requests to a [`PersonaHandler`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{trace, warn};

use super::transport::{Destination, ResponseCallback, Transport};
use crate::error::{Error, Result};
use crate::persona::PersonaHandler;

#[derive(Default)]
struct Counters {
    sent: AtomicU64,
    delivered: AtomicU64,
    muted: AtomicBool,
}

/// Transport that hands every request to one in-process handler.
///
/// Each request is answered on a spawned task after the configured latency.
/// With a group size above one, the response is delivered that many times,
/// as when a whole persona group answers.
pub struct LoopbackTransport {
    handler: Arc<PersonaHandler>,
    latency: Duration,
    group_size: usize,
    counters: Arc<Counters>,
}

impl LoopbackTransport {
    /// Create a transport delivering to `handler` without delay.
    #[must_use]
    pub fn new(handler: Arc<PersonaHandler>) -> Self {
        Self {
            handler,
            latency: Duration::ZERO,
            group_size: 1,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Deliver every response `group_size` times.
    #[must_use]
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size.max(1);
        self
    }

    /// The handler requests are delivered to.
    #[must_use]
    pub fn handler(&self) -> &Arc<PersonaHandler> {
        &self.handler
    }

    /// Drop responses instead of delivering them while `muted` is set.
    /// Requests are still handled.
    pub fn set_muted(&self, muted: bool) {
        self.counters.muted.store(muted, Ordering::SeqCst);
    }

    /// Number of requests sent.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.counters.sent.load(Ordering::SeqCst)
    }

    /// Number of responses delivered to callbacks.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::SeqCst)
    }
}

impl Transport for LoopbackTransport {
    fn send(
        &self,
        destination: Destination,
        message: Vec<u8>,
        cacheable: bool,
        on_response: ResponseCallback,
    ) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Network(format!("no async runtime: {e}")))?;
        self.counters.sent.fetch_add(1, Ordering::SeqCst);
        trace!(
            "Loopback request to {:?} at {} (cacheable={cacheable})",
            destination.persona,
            hex::encode(destination.name)
        );

        let handler = Arc::clone(&self.handler);
        let counters = Arc::clone(&self.counters);
        let latency = self.latency;
        let group_size = self.group_size;
        runtime.spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let response = match handler.handle_message(&message) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Loopback handler rejected request: {e}");
                    return;
                }
            };
            if counters.muted.load(Ordering::SeqCst) {
                trace!("Loopback response dropped (muted)");
                return;
            }
            for _ in 0..group_size {
                counters.delivered.fetch_add(1, Ordering::SeqCst);
                on_response(response.to_vec());
            }
        });
        Ok(())
    }
}
