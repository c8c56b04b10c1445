// ── Device session ──
//
// Async facade over a `ComponentSet`. One processor task owns the set
// and consumes link events, inbound commands, intents and transfer
// reports, so every controller reaction runs on a single event path.

use std::sync::Arc;

use dronesync_api::ProtocolCommand;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::{Intent, IntentEnvelope, RequestOutcome};
use crate::components::{ComponentSet, LinkEvent};
use crate::error::CoreError;
use crate::store::PeripheralStore;
use crate::transfer::TransferReport;

const EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

enum SessionEvent {
    Link(LinkEvent),
    Command(ProtocolCommand),
    Intent(IntentEnvelope),
    Flush(oneshot::Sender<()>),
}

// ── DeviceSession ────────────────────────────────────────────────────

/// Cheaply cloneable handle to a running device session.
#[derive(Clone)]
pub struct DeviceSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    peripherals: Arc<PeripheralStore>,
    connection_state: watch::Sender<ConnectionState>,
    event_tx: mpsc::Sender<SessionEvent>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceSession {
    /// Spawn the processor task for `components`. Must be called from
    /// within a tokio runtime.
    pub fn start(mut components: ComponentSet) -> Self {
        let peripherals = Arc::clone(components.peripherals());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let reports = components.take_report_receiver();

        let handle = tokio::spawn(processor_task(
            components,
            event_rx,
            reports,
            connection_state.clone(),
            cancel.clone(),
        ));

        Self {
            inner: Arc::new(SessionInner {
                peripherals,
                connection_state,
                event_tx,
                cancel,
                task: Mutex::new(Some(handle)),
            }),
        }
    }

    /// Publication store of this session's peripherals.
    pub fn peripherals(&self) -> &Arc<PeripheralStore> {
        &self.inner.peripherals
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Event ingress ────────────────────────────────────────────────

    pub async fn link_event(&self, event: LinkEvent) -> Result<(), CoreError> {
        self.send(SessionEvent::Link(event)).await
    }

    pub async fn receive_command(&self, command: ProtocolCommand) -> Result<(), CoreError> {
        self.send(SessionEvent::Command(command)).await
    }

    /// Hand an intent to its controller and wait for the outcome.
    pub async fn execute(&self, intent: Intent) -> Result<RequestOutcome, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionEvent::Intent(IntentEnvelope {
            intent,
            response_tx: tx,
        }))
        .await?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }

    async fn send(&self, event: SessionEvent) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::SessionClosed);
        }
        self.inner
            .event_tx
            .send(event)
            .await
            .map_err(|_| CoreError::SessionClosed)
    }

    /// Wait until every event queued before this call has been handled.
    pub async fn flush(&self) -> Result<(), CoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionEvent::Flush(tx)).await?;
        rx.await.map_err(|_| CoreError::SessionClosed)
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    /// Stop the processor task and wait for it to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            let _ = handle.await;
        }
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("device session stopped");
    }
}

// ── Processor ────────────────────────────────────────────────────────

async fn processor_task(
    mut components: ComponentSet,
    mut events: mpsc::Receiver<SessionEvent>,
    mut reports: Option<mpsc::UnboundedReceiver<TransferReport>>,
    connection_state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                handle_event(&mut components, &connection_state, event);
            }
            Some(report) = next_report(&mut reports) => {
                components.handle_report(report);
            }
        }
    }
}

async fn next_report(
    reports: &mut Option<mpsc::UnboundedReceiver<TransferReport>>,
) -> Option<TransferReport> {
    match reports {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn handle_event(
    components: &mut ComponentSet,
    connection_state: &watch::Sender<ConnectionState>,
    event: SessionEvent,
) {
    match event {
        SessionEvent::Link(link) => {
            components.handle_link(link);
            let state = match link {
                LinkEvent::WillConnect => ConnectionState::Connecting,
                LinkEvent::DidConnect => ConnectionState::Connected,
                LinkEvent::DidDisconnect | LinkEvent::Forget => ConnectionState::Disconnected,
                LinkEvent::DataSyncConsent(_) => return,
            };
            connection_state.send_replace(state);
        }
        SessionEvent::Command(command) => components.route(&command),
        SessionEvent::Intent(envelope) => {
            let outcome = components.execute(envelope.intent);
            let _ = envelope.response_tx.send(outcome);
        }
        SessionEvent::Flush(done) => {
            let _ = done.send(());
        }
    }
}
