//! Single-resolution completion of in-flight operations.
//!
//! An operation can be resolved by three independent triggers: a response, its
//! timer, or the client stopping. Whichever fires first settles the
//! [`Completion`]; every later trigger finds the sender already taken and does
//! nothing.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::nfs_protocol::{ErrorCode, RoutingError};

/// Error an operation resolves with when its timer fires first.
pub(crate) fn timed_out() -> Error {
    Error::Code(ErrorCode::Routing(RoutingError::TimedOut))
}

/// Error an operation resolves with when it is cancelled.
pub(crate) fn cancelled() -> Error {
    Error::Code(ErrorCode::Routing(RoutingError::TimerCancelled))
}

/// Something the registry can cancel without knowing its result type.
trait Cancel: Send + Sync {
    fn cancel(&self);
}

struct CompletionState<T> {
    sender: Option<oneshot::Sender<Result<T>>>,
    timer: Option<AbortHandle>,
}

/// Settles one operation exactly once.
pub(crate) struct Completion<T> {
    id: u64,
    registry: Weak<PendingOperations>,
    state: Mutex<CompletionState<T>>,
}

impl<T: Send + 'static> Completion<T> {
    /// Resolve the operation. Returns `false` if it was already settled.
    pub(crate) fn settle(&self, result: Result<T>) -> bool {
        let (sender, timer) = {
            let mut state = self.state.lock();
            (state.sender.take(), state.timer.take())
        };
        let Some(sender) = sender else {
            return false;
        };

        if let Some(timer) = timer {
            timer.abort();
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
        if sender.send(result).is_err() {
            trace!("Operation {} was dropped before it settled", self.id);
        }
        true
    }

    /// Attach the timeout timer, so settling stops it.
    pub(crate) fn set_timer(&self, timer: AbortHandle) {
        let mut state = self.state.lock();
        if state.sender.is_some() {
            state.timer = Some(timer);
        } else {
            timer.abort();
        }
    }

    /// Whether the operation has been resolved.
    pub(crate) fn is_settled(&self) -> bool {
        self.state.lock().sender.is_none()
    }
}

impl<T: Send + 'static> Cancel for Completion<T> {
    fn cancel(&self) {
        if self.settle(Err(cancelled())) {
            debug!("Operation {} cancelled", self.id);
        }
    }
}

#[derive(Default)]
struct Registry {
    stopped: bool,
    operations: HashMap<u64, Arc<dyn Cancel>>,
}

/// Every operation that has not settled yet.
#[derive(Default)]
pub(crate) struct PendingOperations {
    next_id: AtomicU64,
    registry: Mutex<Registry>,
}

impl PendingOperations {
    /// Register a new operation.
    ///
    /// After [`stop`](Self::stop) the returned operation is already cancelled.
    pub(crate) fn register<T: Send + 'static>(
        self: &Arc<Self>,
    ) -> (Arc<Completion<T>>, Operation<T>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        let completion = Arc::new(Completion {
            id,
            registry: Arc::downgrade(self),
            state: Mutex::new(CompletionState {
                sender: Some(sender),
                timer: None,
            }),
        });

        let stopped = {
            let mut registry = self.registry.lock();
            if !registry.stopped {
                let cancel: Arc<dyn Cancel> = completion.clone();
                registry.operations.insert(id, cancel);
            }
            registry.stopped
        };
        if stopped {
            completion.cancel();
        }

        (completion, Operation { id, receiver })
    }

    /// Cancel every pending operation and refuse new ones. Returns how many
    /// were cancelled.
    pub(crate) fn stop(&self) -> usize {
        let drained: Vec<Arc<dyn Cancel>> = {
            let mut registry = self.registry.lock();
            registry.stopped = true;
            registry.operations.drain().map(|(_, op)| op).collect()
        };
        for operation in &drained {
            operation.cancel();
        }
        drained.len()
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.registry.lock().stopped
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.lock().operations.len()
    }

    fn remove(&self, id: u64) {
        self.registry.lock().operations.remove(&id);
    }
}

/// Result of an in-flight operation.
///
/// The request is already sent when this is returned; awaiting only waits
/// for the outcome. Resolves exactly once, with the response, a timeout error
/// or a cancellation error.
#[must_use = "an operation's outcome is only observed by awaiting it"]
pub struct Operation<T> {
    id: u64,
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> Operation<T> {
    /// Client-local operation number, used in logs.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> std::fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation").field("id", &self.id).finish()
    }
}

impl<T> Future for Operation<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // Every completion sends before it drops its sender.
            Poll::Ready(Err(_)) => Poll::Ready(Err(cancelled())),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::nfs_protocol::VaultError;

    #[tokio::test]
    async fn test_first_settle_wins() {
        let pending = Arc::new(PendingOperations::default());
        let (completion, operation) = pending.register::<u32>();
        assert_eq!(pending.len(), 1);

        assert!(completion.settle(Ok(7)));
        assert!(!completion.settle(Ok(8)));
        assert!(!completion.settle(Err(timed_out())));
        assert!(completion.is_settled());
        assert_eq!(pending.len(), 0);

        assert_eq!(operation.await.expect("value"), 7);
    }

    #[tokio::test]
    async fn test_stop_cancels_pending() {
        let pending = Arc::new(PendingOperations::default());
        let (first, op1) = pending.register::<()>();
        let (_second, op2) = pending.register::<()>();

        assert_eq!(pending.stop(), 2);
        assert!(op1.await.unwrap_err().is_cancelled());
        assert!(op2.await.unwrap_err().is_cancelled());

        // A late response has no effect.
        assert!(!first.settle(Ok(())));
        assert_eq!(pending.len(), 0);
    }

    #[tokio::test]
    async fn test_register_after_stop_is_cancelled() {
        let pending = Arc::new(PendingOperations::default());
        pending.stop();
        assert!(pending.is_stopped());

        let (completion, operation) = pending.register::<()>();
        assert!(completion.is_settled());
        assert_eq!(pending.len(), 0);
        assert!(operation.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_settle_aborts_timer() {
        let pending = Arc::new(PendingOperations::default());
        let (completion, operation) = pending.register::<()>();

        let timer_completion = Arc::clone(&completion);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            timer_completion.settle(Err(timed_out()));
        });
        completion.set_timer(timer.abort_handle());

        assert!(completion.settle(Err(Error::Code(VaultError::NoSuchData.into()))));
        assert!(timer.await.unwrap_err().is_cancelled());
        assert!(matches!(
            operation.await,
            Err(Error::Code(ErrorCode::StorageNode(VaultError::NoSuchData)))
        ));
    }

    #[tokio::test]
    async fn test_dropped_operation_does_not_block_settle() {
        let pending = Arc::new(PendingOperations::default());
        let (completion, operation) = pending.register::<()>();
        drop(operation);
        assert!(completion.settle(Ok(())));
    }
}
