// ── Battery gauge firmware updater ──

use dronesync_api::features::gauge_updater::{
    self, GaugeDiag, GaugeRequirement, GaugeResult, GaugeState, GaugeUpdaterEvent,
};
use dronesync_api::{FeatureTag, ProtocolCommand};
use tracing::trace;

use crate::bitfield::BitfieldEnum;
use crate::command::{GaugeUpdaterIntent, Intent, RejectReason, RequestOutcome};
use crate::controller::{Context, Peripheral};
use crate::model::{BatteryGaugeUpdater, GaugeUpdaterState, PeripheralKind, UnavailabilityReason};

impl BitfieldEnum for UnavailabilityReason {
    type Protocol = GaugeRequirement;

    fn encode_bit(self) -> GaugeRequirement {
        match self {
            Self::NotUsbPowered => GaugeRequirement::Usb,
            Self::InsufficientCharge => GaugeRequirement::Rsoc,
            Self::DroneNotLanded => GaugeRequirement::DroneState,
        }
    }

    fn from_protocol(value: GaugeRequirement) -> Option<Self> {
        Some(match value {
            GaugeRequirement::Usb => Self::NotUsbPowered,
            GaugeRequirement::Rsoc => Self::InsufficientCharge,
            GaugeRequirement::DroneState => Self::DroneNotLanded,
        })
    }
}

fn updater_state(state: GaugeState) -> GaugeUpdaterState {
    match state {
        GaugeState::ReadyToPrepare => GaugeUpdaterState::ReadyToPrepare,
        GaugeState::PreparationInProgress => GaugeUpdaterState::PreparingUpdate,
        GaugeState::ReadyToUpdate => GaugeUpdaterState::ReadyToUpdate,
        GaugeState::UpdateInProgress => GaugeUpdaterState::Updating,
    }
}

/// Published only while the gauge reports an available update.
#[derive(Debug, Default)]
pub struct BatteryGaugeUpdaterPeripheral;

impl Peripheral for BatteryGaugeUpdaterPeripheral {
    type Model = BatteryGaugeUpdater;
    type Event = GaugeUpdaterEvent;
    type Intent = GaugeUpdaterIntent;

    const KIND: PeripheralKind = PeripheralKind::BatteryGaugeUpdater;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::GAUGE_FW_UPDATER];
    const GATED: bool = true;

    fn decode(command: &ProtocolCommand) -> Result<Option<GaugeUpdaterEvent>, dronesync_api::Error> {
        gauge_updater::decode(command)
    }

    fn intent(intent: Intent) -> Option<GaugeUpdaterIntent> {
        match intent {
            Intent::BatteryGaugeUpdater(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_event(&mut self, cx: &mut Context<'_, BatteryGaugeUpdater>, event: GaugeUpdaterEvent) {
        match event {
            GaugeUpdaterEvent::Status {
                diag,
                missing_requirements,
                state,
            } => {
                match diag {
                    Some(diag) => cx.set_supported(diag == GaugeDiag::Updatable),
                    None => trace!("unknown gauge diagnostic"),
                }
                cx.set(
                    |m| &mut m.unavailability_reasons,
                    UnavailabilityReason::decode_set(missing_requirements),
                );
                match state {
                    Some(state) => cx.set(|m| &mut m.state, updater_state(state)),
                    None => trace!("unknown gauge updater state"),
                }
            }
            GaugeUpdaterEvent::Progress { result, percent } => {
                if cx.model().state == GaugeUpdaterState::PreparingUpdate {
                    cx.set(|m| &mut m.progress, percent.min(100));
                }
                match result {
                    Some(GaugeResult::BatteryError) => {
                        cx.set(|m| &mut m.state, GaugeUpdaterState::Error);
                    }
                    Some(GaugeResult::InProgress | GaugeResult::Success) => {}
                    None => trace!("unknown gauge update result"),
                }
            }
        }
    }

    fn on_intent(
        &mut self,
        cx: &mut Context<'_, BatteryGaugeUpdater>,
        intent: GaugeUpdaterIntent,
    ) -> RequestOutcome {
        let model = cx.model();
        match intent {
            GaugeUpdaterIntent::PrepareUpdate => {
                if model.state != GaugeUpdaterState::ReadyToPrepare
                    || !model.unavailability_reasons.is_empty()
                {
                    return RejectReason::InvalidState.into();
                }
                cx.request(gauge_updater::prepare())
            }
            GaugeUpdaterIntent::Update => {
                if model.state != GaugeUpdaterState::ReadyToUpdate {
                    return RejectReason::InvalidState.into();
                }
                cx.request(gauge_updater::update())
            }
        }
    }
}
