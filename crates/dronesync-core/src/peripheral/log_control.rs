// ── Log control (security edition) ──

use dronesync_api::features::security::{self, LogStorageState, SecurityCapability, SecurityEvent};
use dronesync_api::{FeatureTag, ProtocolCommand, ProtocolEnum};
use tracing::trace;

use crate::command::{Intent, LogControlIntent, RejectReason, RequestOutcome};
use crate::controller::{Context, Peripheral};
use crate::model::{LogControl, PeripheralKind};

/// Published only when the device can deactivate its logs.
#[derive(Debug, Default)]
pub struct LogControlPeripheral;

impl Peripheral for LogControlPeripheral {
    type Model = LogControl;
    type Event = SecurityEvent;
    type Intent = LogControlIntent;

    const KIND: PeripheralKind = PeripheralKind::LogControl;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::SECURITY_EDITION];
    const GATED: bool = true;

    fn decode(command: &ProtocolCommand) -> Result<Option<SecurityEvent>, dronesync_api::Error> {
        security::decode(command)
    }

    fn intent(intent: Intent) -> Option<LogControlIntent> {
        match intent {
            Intent::LogControl(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_event(&mut self, cx: &mut Context<'_, LogControl>, event: SecurityEvent) {
        match event {
            SecurityEvent::Capabilities(bitfield) => {
                let supported = SecurityCapability::DeactivateLogs.is_set_in(bitfield);
                cx.set_supported(supported);
                cx.set(|m| &mut m.can_deactivate_logs, supported);
            }
            SecurityEvent::LogStorageState(Some(state)) => {
                cx.set(|m| &mut m.logs_enabled, Some(state == LogStorageState::Enabled));
            }
            SecurityEvent::LogStorageState(None) => trace!("unknown log storage state"),
        }
    }

    fn on_intent(&mut self, cx: &mut Context<'_, LogControl>, intent: LogControlIntent) -> RequestOutcome {
        let LogControlIntent::DeactivateLogs = intent;
        if !cx.model().can_deactivate_logs {
            return RejectReason::Unsupported.into();
        }
        if cx.model().logs_enabled == Some(false) {
            return RejectReason::InvalidState.into();
        }
        cx.request(security::deactivate_logs())
    }
}
