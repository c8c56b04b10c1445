// ── Beeper ──

use dronesync_api::features::sound::{self, AlertSoundState, SoundEvent};
use dronesync_api::{FeatureTag, ProtocolCommand};

use crate::command::{BeeperIntent, Intent, RejectReason, RequestOutcome};
use crate::controller::{Context, Peripheral};
use crate::model::{Beeper, PeripheralKind};

/// Alert sound of the drone.
#[derive(Debug, Default)]
pub struct BeeperPeripheral;

impl Peripheral for BeeperPeripheral {
    type Model = Beeper;
    type Event = SoundEvent;
    type Intent = BeeperIntent;

    const KIND: PeripheralKind = PeripheralKind::Beeper;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::ARDRONE3_SOUND_STATE];

    fn decode(command: &ProtocolCommand) -> Result<Option<SoundEvent>, dronesync_api::Error> {
        sound::decode(command)
    }

    fn intent(intent: Intent) -> Option<BeeperIntent> {
        match intent {
            Intent::Beeper(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_event(&mut self, cx: &mut Context<'_, Beeper>, event: SoundEvent) {
        match event {
            SoundEvent::AlertSound(Some(state)) => {
                cx.set(|m| &mut m.alerting, state == AlertSoundState::Playing);
            }
            SoundEvent::AlertSound(None) => {
                tracing::trace!("unknown alert sound state");
            }
        }
    }

    fn on_intent(&mut self, cx: &mut Context<'_, Beeper>, intent: BeeperIntent) -> RequestOutcome {
        let (wanted, command) = match intent {
            BeeperIntent::StartAlertSound => (true, sound::start_alert_sound()),
            BeeperIntent::StopAlertSound => (false, sound::stop_alert_sound()),
        };
        if cx.model().alerting == wanted {
            return RejectReason::InvalidState.into();
        }
        cx.request(command)
    }
}
