// Shared spawn/cancel bookkeeping for delegates.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use super::TransferId;

struct Running {
    id: TransferId,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// At most one live transfer task, identified by a [`TransferId`].
#[derive(Default)]
pub(crate) struct TransferTask {
    last_id: TransferId,
    running: Option<Running>,
}

impl TransferTask {
    /// A task is active until it finishes or is cancelled. A cancelled
    /// task still winding down does not block a new spawn.
    pub fn is_active(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.token.is_cancelled() && !r.handle.is_finished())
    }

    /// Whether `transfer` is the most recently spawned task and has not
    /// been reset since.
    pub fn is_current(&self, transfer: TransferId) -> bool {
        self.running.as_ref().is_some_and(|r| r.id == transfer)
    }

    /// Spawn the task built by `make` unless one is already active.
    ///
    /// `make` receives the cancellation token and the id its reports must
    /// carry. Returns `false` when no tokio runtime is available.
    pub fn spawn<F>(&mut self, make: impl FnOnce(CancellationToken, TransferId) -> F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_active() {
            return true;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime, transfer not started");
            return false;
        };
        if let Some(previous) = self.running.take() {
            trace!(superseded = ?previous.id, "previous transfer still winding down");
            previous.token.cancel();
        }
        let id = self.last_id.next();
        self.last_id = id;
        let token = CancellationToken::new();
        let handle = runtime.spawn(make(token.clone(), id));
        self.running = Some(Running { id, token, handle });
        true
    }

    /// Cooperative cancellation of the running task, if any. Its final
    /// report stays current.
    pub fn cancel(&self) {
        if let Some(running) = &self.running {
            running.token.cancel();
        }
    }

    /// Cancel and forget the running task. Its reports are no longer
    /// current.
    pub fn reset(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
        }
    }
}

impl Drop for TransferTask {
    fn drop(&mut self) {
        self.reset();
    }
}
