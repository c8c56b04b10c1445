// ── Generic peripheral controller ──
//
// `Peripheral` is the small capability interface a concrete peripheral
// implements: its feature tags, decode step, model type, gating and
// intent type. `PeripheralController<P>` wraps it with everything that
// is uniform: reaction batching, publication, capability gating and the
// connected/disconnected reconciliation rule.

use std::sync::Arc;

use dronesync_api::{FeatureTag, ProtocolCommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use super::{ComponentController, Environment, LinkState};
use crate::command::{Intent, RejectReason, RequestOutcome};
use crate::model::PeripheralKind;
use crate::store::{PeripheralStore, PublicationSlot, StoredModel};
use crate::transfer::{TransferEvent, TransferId};

// ── Peripheral ──────────────────────────────────────────────────────

/// Per-capability behaviour plugged into [`PeripheralController`].
///
/// Every hook runs inside one reaction: all model changes it makes are
/// published with a single notification at the end.
pub trait Peripheral: Send + 'static {
    type Model: Clone + Default + PartialEq + Send + Sync + 'static;
    type Event;
    type Intent;

    const KIND: PeripheralKind;

    /// Feature tags routed to this peripheral.
    const FEATURES: &'static [FeatureTag] = &[];

    /// Gated peripherals publish only once the device reported support.
    const GATED: bool = false;

    /// Decode a routed command. `Ok(None)` for commands of no interest.
    fn decode(_command: &ProtocolCommand) -> Result<Option<Self::Event>, dronesync_api::Error> {
        Ok(None)
    }

    /// Extract this peripheral's intent from a session-level intent.
    fn intent(_intent: Intent) -> Option<Self::Intent> {
        None
    }

    fn on_event(&mut self, _cx: &mut Context<'_, Self::Model>, _event: Self::Event) {}

    fn on_intent(
        &mut self,
        _cx: &mut Context<'_, Self::Model>,
        _intent: Self::Intent,
    ) -> RequestOutcome {
        RequestOutcome::Rejected(RejectReason::Unsupported)
    }

    fn on_attach(&mut self, _cx: &mut Context<'_, Self::Model>) {}

    fn on_will_connect(&mut self, _cx: &mut Context<'_, Self::Model>) {}

    fn on_connect(&mut self, _cx: &mut Context<'_, Self::Model>) {}

    /// Reset transient state. Runs with the link already down.
    fn on_disconnect(&mut self, cx: &mut Context<'_, Self::Model>) {
        cx.reset_model();
    }

    fn on_forget(&mut self, _cx: &mut Context<'_, Self::Model>) {}

    fn on_data_sync_allowance(&mut self, _cx: &mut Context<'_, Self::Model>, _allowed: bool) {}

    fn on_transfer_event(
        &mut self,
        _cx: &mut Context<'_, Self::Model>,
        _transfer: TransferId,
        _event: TransferEvent,
    ) {
    }

    /// Whether the model stays visible while disconnected.
    fn publish_offline(&self, _model: &Self::Model) -> bool {
        false
    }
}

// ── Context ─────────────────────────────────────────────────────────

/// Device support for a gated peripheral, as reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Support {
    #[default]
    Unknown,
    Supported,
    Unsupported,
}

/// Mutable view of a controller during one reaction.
pub struct Context<'a, M> {
    kind: PeripheralKind,
    model: &'a mut M,
    support: &'a mut Support,
    changed: bool,
    env: &'a Environment<'a>,
}

impl<M: Default + PartialEq> Context<'_, M> {
    pub fn model(&self) -> &M {
        self.model
    }

    /// Mutate the model; `f` returns whether it changed anything.
    pub fn update(&mut self, f: impl FnOnce(&mut M) -> bool) {
        if f(&mut *self.model) {
            self.changed = true;
        }
    }

    /// Assign one field, marking the model changed only on a new value.
    pub fn set<V: PartialEq>(&mut self, field: impl FnOnce(&mut M) -> &mut V, value: V) {
        let slot = field(&mut *self.model);
        if *slot != value {
            *slot = value;
            self.changed = true;
        }
    }

    /// Return the model to its initial state.
    pub fn reset_model(&mut self) {
        let fresh = M::default();
        if *self.model != fresh {
            *self.model = fresh;
            self.changed = true;
        }
    }

    pub fn link(&self) -> LinkState {
        self.env.link
    }

    pub fn is_connected(&self) -> bool {
        self.env.link.connected
    }

    pub fn data_sync_allowed(&self) -> bool {
        self.env.link.data_sync_allowed
    }

    /// Send `command` if connected. Returns whether it was sent.
    pub fn send(&self, command: ProtocolCommand) -> bool {
        if !self.is_connected() {
            trace!(kind = %self.kind, feature = %command.feature, "not connected, command dropped");
            return false;
        }
        self.env.sink.send_command(command);
        true
    }

    /// Send a command that only makes sense on a live link.
    pub fn request(&self, command: ProtocolCommand) -> RequestOutcome {
        if self.send(command) {
            RequestOutcome::Sent
        } else {
            RequestOutcome::Rejected(RejectReason::NotConnected)
        }
    }

    /// Reconcile a setting change with the device.
    ///
    /// Connected: `command` is sent and the model is left untouched until
    /// the device confirms. Disconnected: `apply` runs on the model right
    /// away and nothing is sent.
    pub fn reconcile(
        &mut self,
        command: ProtocolCommand,
        apply: impl FnOnce(&mut M) -> bool,
    ) -> RequestOutcome {
        if self.send(command) {
            RequestOutcome::Sent
        } else {
            self.update(apply);
            RequestOutcome::AppliedLocally
        }
    }

    /// Record whether the device supports this peripheral.
    pub fn set_supported(&mut self, supported: bool) {
        *self.support = if supported {
            Support::Supported
        } else {
            Support::Unsupported
        };
    }

    /// Persist `value` under a key scoped to this peripheral.
    pub fn persist<V: Serialize>(&self, key: &str, value: &V) {
        match serde_json::to_value(value) {
            Ok(json) => self.env.store.write(&self.store_key(key), json),
            Err(e) => warn!(kind = %self.kind, key, error = %e, "cannot serialize stored value"),
        }
    }

    /// Read a persisted value; `None` when missing or unreadable.
    pub fn stored<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let json = self.env.store.read(&self.store_key(key))?;
        serde_json::from_value(json)
            .inspect_err(|e| warn!(kind = %self.kind, key, error = %e, "ignoring stored value"))
            .ok()
    }

    fn store_key(&self, key: &str) -> String {
        format!("{}.{key}", self.kind)
    }
}

// ── PeripheralController ────────────────────────────────────────────

/// Framework controller for one peripheral.
pub struct PeripheralController<P: Peripheral> {
    peripheral: P,
    model: P::Model,
    support: Support,
    slot: Arc<PublicationSlot<P::Model>>,
}

impl<P: Peripheral> PeripheralController<P> {
    pub fn new(peripheral: P, slot: Arc<PublicationSlot<P::Model>>) -> Self {
        Self {
            peripheral,
            model: P::Model::default(),
            support: Support::Unknown,
            slot,
        }
    }

    /// Controller publishing into `store`'s slot for the model type.
    pub fn in_store(peripheral: P, store: &PeripheralStore) -> Self
    where
        P::Model: StoredModel,
    {
        Self::new(peripheral, Arc::clone(P::Model::slot(store)))
    }

    pub fn model(&self) -> &P::Model {
        &self.model
    }

    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    /// Run one reaction, then settle publication.
    fn react<R>(
        &mut self,
        env: &Environment<'_>,
        f: impl FnOnce(&mut P, &mut Context<'_, P::Model>) -> R,
    ) -> R {
        let (result, changed) = {
            let mut cx = Context {
                kind: P::KIND,
                model: &mut self.model,
                support: &mut self.support,
                changed: false,
                env,
            };
            let result = f(&mut self.peripheral, &mut cx);
            (result, cx.changed)
        };
        self.settle(env.link.connected, changed);
        result
    }

    /// Apply the visibility rule and emit at most one notification.
    fn settle(&mut self, connected: bool, changed: bool) {
        let visible = if connected {
            !P::GATED || self.support == Support::Supported
        } else {
            self.peripheral.publish_offline(&self.model)
        };

        if !visible {
            if self.slot.unpublish() {
                debug!(kind = %P::KIND, "peripheral unpublished");
            }
        } else if !self.slot.is_published() {
            self.slot.publish(self.model.clone());
            debug!(kind = %P::KIND, "peripheral published");
        } else if changed {
            self.slot.update(self.model.clone());
            trace!(kind = %P::KIND, "peripheral updated");
        }
    }
}

impl<P: Peripheral> ComponentController for PeripheralController<P> {
    fn kind(&self) -> PeripheralKind {
        P::KIND
    }

    fn features(&self) -> &'static [FeatureTag] {
        P::FEATURES
    }

    fn attach(&mut self, env: &Environment<'_>) {
        self.react(env, |p, cx| p.on_attach(cx));
    }

    fn will_connect(&mut self, env: &Environment<'_>) {
        self.react(env, |p, cx| p.on_will_connect(cx));
    }

    fn did_connect(&mut self, env: &Environment<'_>) {
        self.react(env, |p, cx| p.on_connect(cx));
    }

    fn did_disconnect(&mut self, env: &Environment<'_>) {
        self.support = Support::Unknown;
        self.react(env, |p, cx| p.on_disconnect(cx));
    }

    fn will_forget(&mut self, env: &Environment<'_>) {
        self.react(env, |p, cx| {
            p.on_forget(cx);
            cx.reset_model();
        });
        self.support = Support::Unknown;
        if self.slot.unpublish() {
            debug!(kind = %P::KIND, "peripheral unpublished (forgotten)");
        }
    }

    fn data_sync_allowance_changed(&mut self, env: &Environment<'_>, allowed: bool) {
        self.react(env, |p, cx| p.on_data_sync_allowance(cx, allowed));
    }

    fn did_receive_command(&mut self, env: &Environment<'_>, command: &ProtocolCommand) {
        match P::decode(command) {
            Ok(Some(event)) => self.react(env, |p, cx| p.on_event(cx, event)),
            Ok(None) => {
                trace!(kind = %P::KIND, feature = %command.feature, id = command.id, "ignoring command");
            }
            Err(e) => {
                warn!(kind = %P::KIND, feature = %command.feature, id = command.id, error = %e, "malformed command");
            }
        }
    }

    fn handle_intent(&mut self, env: &Environment<'_>, intent: Intent) -> RequestOutcome {
        let Some(intent) = P::intent(intent) else {
            warn!(kind = %P::KIND, "intent addressed to another peripheral");
            return RequestOutcome::Rejected(RejectReason::Unsupported);
        };
        self.react(env, |p, cx| p.on_intent(cx, intent))
    }

    fn on_transfer_event(&mut self, env: &Environment<'_>, transfer: TransferId, event: TransferEvent) {
        self.react(env, |p, cx| p.on_transfer_event(cx, transfer, event));
    }

    fn is_published(&self) -> bool {
        self.slot.is_published()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dronesync_api::Arg;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sink::RecordingSink;
    use crate::store::MemoryDeviceStore;

    // A minimal gated setting peripheral: one numeric value, a support
    // flag and a set intent.
    const FEATURE: FeatureTag = FeatureTag(0x7F00);

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Setting {
        value: u8,
    }

    enum SettingEvent {
        Supported(bool),
        Value(u8),
    }

    #[derive(Default)]
    struct SettingPeripheral {
        offline: bool,
    }

    impl Peripheral for SettingPeripheral {
        type Model = Setting;
        type Event = SettingEvent;
        type Intent = u8;

        const KIND: PeripheralKind = PeripheralKind::Antiflicker;
        const FEATURES: &'static [FeatureTag] = &[FEATURE];
        const GATED: bool = true;

        fn decode(command: &ProtocolCommand) -> Result<Option<SettingEvent>, dronesync_api::Error> {
            let mut args = command.reader();
            Ok(match command.id {
                0 => Some(SettingEvent::Supported(args.u8()? == 1)),
                1 => Some(SettingEvent::Value(args.u8()?)),
                _ => None,
            })
        }

        fn on_event(&mut self, cx: &mut Context<'_, Setting>, event: SettingEvent) {
            match event {
                SettingEvent::Supported(supported) => cx.set_supported(supported),
                SettingEvent::Value(value) => cx.set(|m| &mut m.value, value),
            }
        }

        fn on_intent(&mut self, cx: &mut Context<'_, Setting>, value: u8) -> RequestOutcome {
            let command = ProtocolCommand::new(FEATURE, 9).arg(Arg::U8(value));
            cx.reconcile(command, |m| {
                let changed = m.value != value;
                m.value = value;
                changed
            })
        }

        fn on_disconnect(&mut self, _cx: &mut Context<'_, Setting>) {}

        fn publish_offline(&self, _model: &Setting) -> bool {
            self.offline
        }
    }

    struct Harness {
        controller: PeripheralController<SettingPeripheral>,
        slot: Arc<PublicationSlot<Setting>>,
        sink: RecordingSink,
        store: MemoryDeviceStore,
        link: LinkState,
    }

    impl Harness {
        fn new(offline: bool) -> Self {
            let slot = Arc::new(PublicationSlot::new());
            Self {
                controller: PeripheralController::new(SettingPeripheral { offline }, Arc::clone(&slot)),
                slot,
                sink: RecordingSink::new(),
                store: MemoryDeviceStore::new(),
                link: LinkState::default(),
            }
        }

        fn with_env<R>(
            &mut self,
            f: impl FnOnce(&mut PeripheralController<SettingPeripheral>, &Environment<'_>) -> R,
        ) -> R {
            let env = Environment {
                link: self.link,
                sink: &self.sink,
                store: &self.store,
            };
            f(&mut self.controller, &env)
        }

        fn connect(&mut self) {
            self.with_env(|c, env| c.will_connect(env));
            self.link.connected = true;
            self.with_env(|c, env| c.did_connect(env));
        }

        fn disconnect(&mut self) {
            self.link = LinkState::default();
            self.with_env(|c, env| c.did_disconnect(env));
        }

        fn receive(&mut self, id: u16, value: u8) {
            let command = ProtocolCommand::new(FEATURE, id).arg(Arg::U8(value));
            self.with_env(|c, env| c.did_receive_command(env, &command));
        }

        fn set(&mut self, value: u8) -> RequestOutcome {
            self.with_env(|c, env| c.react(env, |p, cx| p.on_intent(cx, value)))
        }

        fn value(&self) -> Option<u8> {
            self.slot.current().map(|m| m.value)
        }
    }

    #[test]
    fn gated_peripheral_publishes_when_support_arrives_after_connect() {
        let mut h = Harness::new(false);
        h.connect();
        assert!(!h.slot.is_published());

        h.receive(0, 1);
        assert!(h.slot.is_published());
        assert_eq!(h.slot.notification_count(), 1);

        h.receive(0, 0);
        assert!(!h.slot.is_published());
        assert_eq!(h.slot.notification_count(), 2);
    }

    #[test]
    fn disconnect_unpublishes_and_forgets_support() {
        let mut h = Harness::new(false);
        h.connect();
        h.receive(0, 1);
        h.disconnect();
        assert!(!h.slot.is_published());

        h.connect();
        assert!(!h.slot.is_published(), "support must be re-reported per connection");
    }

    #[test]
    fn one_notification_per_reaction_and_none_without_change() {
        let mut h = Harness::new(false);
        h.connect();
        h.receive(0, 1);
        h.receive(1, 4);
        assert_eq!(h.slot.notification_count(), 2);
        h.receive(1, 4);
        assert_eq!(h.slot.notification_count(), 2);
    }

    #[test]
    fn malformed_and_unknown_commands_leave_the_model_alone() {
        let mut h = Harness::new(false);
        h.connect();
        h.receive(0, 1);
        let before = h.slot.notification_count();

        let malformed = ProtocolCommand::new(FEATURE, 1).arg(Arg::Str("x".into()));
        h.with_env(|c, env| c.did_receive_command(env, &malformed));
        h.receive(42, 3);
        assert_eq!(h.slot.notification_count(), before);
        assert_eq!(h.value(), Some(0));
    }

    #[test]
    fn connected_request_sends_and_waits_for_confirmation() {
        let mut h = Harness::new(false);
        h.connect();
        h.receive(0, 1);

        assert_eq!(h.set(5), RequestOutcome::Sent);
        assert_eq!(h.value(), Some(0));
        assert_eq!(h.sink.sent().len(), 1);
        assert_eq!(h.sink.sent()[0].args, vec![Arg::U8(5)]);

        h.receive(1, 5);
        assert_eq!(h.value(), Some(5));
    }

    #[test]
    fn disconnected_request_applies_locally_then_device_value_wins() {
        let mut h = Harness::new(true);
        h.with_env(|c, env| c.attach(env));
        assert!(h.slot.is_published());

        assert_eq!(h.set(5), RequestOutcome::AppliedLocally);
        assert_eq!(h.value(), Some(5));
        assert!(h.sink.sent().is_empty());

        h.connect();
        h.receive(0, 1);
        h.receive(1, 7);
        assert_eq!(h.value(), Some(7));
    }

    #[test]
    fn forget_forces_unpublish_even_when_offline_visible() {
        let mut h = Harness::new(true);
        h.with_env(|c, env| c.attach(env));
        assert!(h.slot.is_published());
        h.with_env(|c, env| c.will_forget(env));
        assert!(!h.slot.is_published());
        assert_eq!(h.controller.model(), &Setting::default());
    }

    #[test]
    fn intent_for_another_peripheral_is_rejected() {
        let mut h = Harness::new(false);
        h.connect();
        let outcome = h.with_env(|c, env| {
            c.handle_intent(env, Intent::SystemInfo(crate::command::SystemInfoIntent::ResetSettings))
        });
        assert_eq!(outcome, RequestOutcome::Rejected(RejectReason::Unsupported));
        assert!(h.sink.sent().is_empty());
    }
}
