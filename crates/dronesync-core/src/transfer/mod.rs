// ── Transfer delegates ──
//
// Long-running transfers (flight logs, certificates) run on tokio tasks
// behind a `TransferDelegate`. Delegates never touch models: they report
// through a `TransferReporter` whose events re-enter the session's event
// path and reach the owning controller.

mod ftp_flight_log;
mod http_certificate;
mod http_flight_log;
mod task;

pub use ftp_flight_log::{FileTransferBackend, FtpFlightLogDelegate, LocalDirectoryBackend, RemoteFile};
pub use http_certificate::HttpCertificateDelegate;
pub use http_flight_log::HttpFlightLogDelegate;

use std::path::Path;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

use crate::model::PeripheralKind;

/// Interchangeable transfer strategy behind one controller.
pub trait TransferDelegate: Send + 'static {
    /// Prepare for transfers. Called once per connection.
    fn configure(&mut self);

    /// Drop any transfer state. Safe with no active transfer.
    fn reset(&mut self);

    /// Start a transfer towards (or from) `target`.
    ///
    /// Returns `false` when nothing was started. Starting while a
    /// transfer is already running is a no-op returning `true`.
    fn start_transfer(&mut self, target: &Path) -> bool;

    /// Request cancellation. Termination is acknowledged asynchronously
    /// by an `Interrupted` report.
    fn cancel(&mut self);

    /// Whether reports tagged `transfer` belong to the transfer this
    /// delegate currently owns. Reports of cancelled or reset transfers
    /// are not current.
    fn is_current(&self, transfer: TransferId) -> bool;
}

/// Identifies one spawned transfer. Every spawn and every reset moves to
/// a new id, so reports of a superseded task never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TransferId(u64);

impl TransferId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Final status of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Success,
    Interrupted,
    Failed,
}

/// Progress reported by a delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferEvent {
    /// Items completed so far in the running transfer.
    Progress { completed: u32 },
    Finished(TransferStatus),
}

/// A transfer event tagged with its destination controller and the
/// transfer that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub kind: PeripheralKind,
    pub transfer: TransferId,
    pub event: TransferEvent,
}

/// Report handle given to delegates.
#[derive(Debug, Clone)]
pub struct TransferReporter {
    kind: PeripheralKind,
    transfer: TransferId,
    tx: mpsc::UnboundedSender<TransferReport>,
}

impl TransferReporter {
    pub fn new(kind: PeripheralKind, tx: mpsc::UnboundedSender<TransferReport>) -> Self {
        Self {
            kind,
            transfer: TransferId::default(),
            tx,
        }
    }

    /// Reporter paired with a fresh receiver, for standalone use.
    pub fn channel(kind: PeripheralKind) -> (Self, mpsc::UnboundedReceiver<TransferReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(kind, tx), rx)
    }

    /// Same destination, reports tagged with `transfer`.
    #[must_use]
    pub fn for_transfer(&self, transfer: TransferId) -> Self {
        Self {
            kind: self.kind,
            transfer,
            tx: self.tx.clone(),
        }
    }

    pub fn report(&self, event: TransferEvent) {
        let report = TransferReport {
            kind: self.kind,
            transfer: self.transfer,
            event,
        };
        if self.tx.send(report).is_err() {
            trace!(kind = %self.kind, ?event, "session gone, transfer report dropped");
        }
    }
}
