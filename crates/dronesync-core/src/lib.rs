//! Peripheral controller framework and device session for dronesync.
//!
//! - **[`DeviceSession`]**: async facade owning one processor task per
//!   device. Link events, inbound commands, user [`Intent`]s and transfer
//!   reports all flow through a single `mpsc` event path, so controllers
//!   never run concurrently.
//!
//! - **[`ComponentSet`]**: the synchronous dispatcher behind the session.
//!   It drives lifecycle hooks, routes commands by feature tag through the
//!   [`CommandRouter`](controller::CommandRouter) and hands intents to the
//!   target controller.
//!
//! - **[`PeripheralController<P>`](controller::PeripheralController)**:
//!   generic controller over a small [`Peripheral`](controller::Peripheral)
//!   interface. It batches model changes per reaction, applies capability
//!   gating and reconciles setting changes (`Sent` while connected,
//!   `AppliedLocally` otherwise).
//!
//! - **[`PeripheralStore`]**: one `watch` backed publication slot per
//!   peripheral with snapshot and [`PeripheralStream`] subscriptions.
//!
//! - **Transfers** ([`transfer`]): flight log and certificate delegates
//!   running on tokio tasks, cancelled through `CancellationToken`s.

pub mod bitfield;
pub mod command;
pub mod components;
pub mod config;
pub mod controller;
pub mod error;
pub mod fragment;
pub mod model;
pub mod peripheral;
pub mod session;
pub mod sink;
pub mod store;
pub mod stream;
pub mod transfer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bitfield::BitfieldEnum;
pub use command::{
    AntiflickerIntent, BeeperIntent, CertificateIntent, GaugeUpdaterIntent, Intent,
    LogControlIntent, MagnetometerIntent, RejectReason, RequestOutcome, SystemInfoIntent,
};
pub use components::{ComponentSet, LinkEvent};
pub use config::{FlightLogConfig, FlightLogTransport, SessionConfig};
pub use error::CoreError;
pub use fragment::FragmentAssembler;
pub use session::{ConnectionState, DeviceSession};
pub use sink::{ChannelSink, CommandSink, RecordingSink};
pub use store::{DeviceStore, FileDeviceStore, MemoryDeviceStore, PeripheralStore};
pub use stream::PeripheralStream;
pub use transfer::{TransferDelegate, TransferEvent, TransferId, TransferStatus};

pub use model::PeripheralKind;
