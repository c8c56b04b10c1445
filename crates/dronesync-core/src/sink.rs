// ── Outbound command sinks ──
//
// Controllers hand encoded commands to a sink; the link layer behind it
// owns framing and delivery.

use std::sync::{Arc, Mutex, PoisonError};

use dronesync_api::ProtocolCommand;
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Destination of outbound protocol commands.
pub trait CommandSink: Send + Sync {
    fn send_command(&self, command: ProtocolCommand);
}

/// Forwards commands into an unbounded channel drained by the link task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProtocolCommand>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProtocolCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl CommandSink for ChannelSink {
    fn send_command(&self, command: ProtocolCommand) {
        trace!(feature = %command.feature, id = command.id, "sending command");
        if self.tx.send(command).is_err() {
            warn!("command link is closed, dropping outbound command");
        }
    }
}

/// Keeps every sent command in memory. Used by replays and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<ProtocolCommand>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent so far, in order.
    pub fn sent(&self) -> Vec<ProtocolCommand> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return the commands sent so far.
    pub fn take(&self) -> Vec<ProtocolCommand> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl CommandSink for RecordingSink {
    fn send_command(&self, command: ProtocolCommand) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command);
    }
}
