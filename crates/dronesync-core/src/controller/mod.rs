// ── Controller framework ──
//
// A component controller owns one peripheral model, reacts to lifecycle
// hooks, routed commands, user intents and transfer reports, and decides
// when its model is visible in the publication store.

mod peripheral;
mod router;

pub use peripheral::{Context, Peripheral, PeripheralController};
pub use router::CommandRouter;

use dronesync_api::{FeatureTag, ProtocolCommand};

use crate::command::{Intent, RequestOutcome};
use crate::model::PeripheralKind;
use crate::sink::CommandSink;
use crate::store::DeviceStore;
use crate::transfer::{TransferEvent, TransferId};

/// Link facts every reaction sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkState {
    /// `true` between `did_connect` and `did_disconnect`.
    pub connected: bool,
    /// Effective data-sync allowance: connected and consented.
    pub data_sync_allowed: bool,
}

/// Shared services handed to controllers for the duration of one call.
pub struct Environment<'a> {
    pub link: LinkState,
    pub sink: &'a dyn CommandSink,
    pub store: &'a dyn DeviceStore,
}

/// Object-safe face of a controller, as driven by the component set.
///
/// Hooks are invoked in the fixed order `will_connect`, `did_connect`,
/// then `did_disconnect`. `will_forget` may follow at any point.
pub trait ComponentController: Send {
    fn kind(&self) -> PeripheralKind;

    /// Feature tags this controller wants routed to it.
    fn features(&self) -> &'static [FeatureTag];

    /// Called once when the controller joins a component set.
    fn attach(&mut self, env: &Environment<'_>);

    fn will_connect(&mut self, env: &Environment<'_>);

    fn did_connect(&mut self, env: &Environment<'_>);

    fn did_disconnect(&mut self, env: &Environment<'_>);

    fn will_forget(&mut self, env: &Environment<'_>);

    fn data_sync_allowance_changed(&mut self, env: &Environment<'_>, allowed: bool);

    fn did_receive_command(&mut self, env: &Environment<'_>, command: &ProtocolCommand);

    fn handle_intent(&mut self, env: &Environment<'_>, intent: Intent) -> RequestOutcome;

    fn on_transfer_event(&mut self, env: &Environment<'_>, transfer: TransferId, event: TransferEvent);

    /// Whether the model is currently published.
    fn is_published(&self) -> bool;
}
