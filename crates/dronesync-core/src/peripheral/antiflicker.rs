// ── Antiflicker ──
//
// Mode is a reconciled setting. With offline settings enabled the last
// known mode and supported modes survive disconnection and are reloaded
// from the device store.

use std::collections::BTreeSet;

use dronesync_api::features::camera::{self, AntiflickerModeCode, AntiflickerValueCode, CameraEvent};
use dronesync_api::{FeatureTag, ProtocolCommand};
use tracing::trace;

use crate::bitfield::BitfieldEnum;
use crate::command::{AntiflickerIntent, Intent, RejectReason, RequestOutcome};
use crate::controller::{Context, Peripheral};
use crate::model::{Antiflicker, AntiflickerMode, AntiflickerValue, PeripheralKind};

const SUPPORTED_MODES_KEY: &str = "supported_modes";
const MODE_KEY: &str = "mode";

impl BitfieldEnum for AntiflickerMode {
    type Protocol = AntiflickerModeCode;

    fn encode_bit(self) -> AntiflickerModeCode {
        match self {
            Self::Off => AntiflickerModeCode::Off,
            Self::Hz50 => AntiflickerModeCode::Mode50Hz,
            Self::Hz60 => AntiflickerModeCode::Mode60Hz,
            Self::Auto => AntiflickerModeCode::Auto,
        }
    }

    fn from_protocol(value: AntiflickerModeCode) -> Option<Self> {
        Some(match value {
            AntiflickerModeCode::Off => Self::Off,
            AntiflickerModeCode::Mode50Hz => Self::Hz50,
            AntiflickerModeCode::Mode60Hz => Self::Hz60,
            AntiflickerModeCode::Auto => Self::Auto,
        })
    }
}

fn value_of(code: AntiflickerValueCode) -> AntiflickerValue {
    match code {
        AntiflickerValueCode::Off => AntiflickerValue::Off,
        AntiflickerValueCode::Value50Hz => AntiflickerValue::Hz50,
        AntiflickerValueCode::Value60Hz => AntiflickerValue::Hz60,
    }
}

#[derive(Debug, Default)]
pub struct AntiflickerPeripheral {
    offline_settings: bool,
}

impl AntiflickerPeripheral {
    pub fn new(offline_settings: bool) -> Self {
        Self { offline_settings }
    }
}

impl Peripheral for AntiflickerPeripheral {
    type Model = Antiflicker;
    type Event = CameraEvent;
    type Intent = AntiflickerIntent;

    const KIND: PeripheralKind = PeripheralKind::Antiflicker;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::CAMERA];

    fn decode(command: &ProtocolCommand) -> Result<Option<CameraEvent>, dronesync_api::Error> {
        camera::decode(command)
    }

    fn intent(intent: Intent) -> Option<AntiflickerIntent> {
        match intent {
            Intent::Antiflicker(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_attach(&mut self, cx: &mut Context<'_, Antiflicker>) {
        if !self.offline_settings {
            return;
        }
        if let Some(modes) = cx.stored::<BTreeSet<AntiflickerMode>>(SUPPORTED_MODES_KEY) {
            cx.set(|m| &mut m.supported_modes, modes);
        }
        if let Some(mode) = cx.stored::<AntiflickerMode>(MODE_KEY) {
            cx.set(|m| &mut m.mode, mode);
        }
    }

    fn on_event(&mut self, cx: &mut Context<'_, Antiflicker>, event: CameraEvent) {
        match event {
            CameraEvent::AntiflickerCapabilities(bitfield) => {
                let modes = AntiflickerMode::decode_set(bitfield);
                cx.persist(SUPPORTED_MODES_KEY, &modes);
                cx.set(|m| &mut m.supported_modes, modes);
            }
            CameraEvent::AntiflickerMode { mode, value } => {
                match mode.and_then(AntiflickerMode::from_protocol) {
                    Some(mode) => {
                        cx.persist(MODE_KEY, &mode);
                        cx.set(|m| &mut m.mode, mode);
                    }
                    None => trace!("unknown antiflicker mode"),
                }
                match value {
                    Some(code) => cx.set(|m| &mut m.value, value_of(code)),
                    None => trace!("unknown antiflicker value"),
                }
            }
        }
    }

    fn on_intent(&mut self, cx: &mut Context<'_, Antiflicker>, intent: AntiflickerIntent) -> RequestOutcome {
        let AntiflickerIntent::SetMode(mode) = intent;
        if cx.is_connected() && !cx.model().supported_modes.contains(&mode) {
            return RejectReason::Unsupported.into();
        }
        let outcome = cx.reconcile(camera::set_antiflicker_mode(mode.encode_bit()), |m| {
            let changed = m.mode != mode;
            m.mode = mode;
            changed
        });
        if outcome == RequestOutcome::AppliedLocally {
            cx.persist(MODE_KEY, &mode);
        }
        outcome
    }

    fn on_disconnect(&mut self, cx: &mut Context<'_, Antiflicker>) {
        if self.offline_settings {
            cx.set(|m| &mut m.value, AntiflickerValue::Unknown);
        } else {
            cx.reset_model();
        }
    }

    fn publish_offline(&self, model: &Antiflicker) -> bool {
        self.offline_settings && !model.supported_modes.is_empty()
    }
}
