// ── System info ──
//
// Identifiers learned from the device are persisted so they are known
// before the next connection. The serial number arrives in two halves.

use std::collections::BTreeSet;

use dronesync_api::features::settings::{self, SettingsStateEvent};
use dronesync_api::{FeatureTag, ProtocolCommand};
use tracing::{debug, info};

use crate::command::{Intent, RejectReason, RequestOutcome, SystemInfoIntent};
use crate::controller::{Context, Peripheral};
use crate::fragment::FragmentAssembler;
use crate::model::{PeripheralKind, SystemInfo};

const SERIAL_HIGH: usize = 0;
const SERIAL_LOW: usize = 1;

const FIRMWARE_KEY: &str = "firmware_version";
const HARDWARE_KEY: &str = "hardware_version";
const SERIAL_KEY: &str = "serial";
const BOARD_ID_KEY: &str = "board_id";

pub struct SystemInfoPeripheral {
    offline_settings: bool,
    firmware_blacklist: BTreeSet<String>,
    serial: FragmentAssembler<String, 2>,
}

impl SystemInfoPeripheral {
    pub fn new(offline_settings: bool, firmware_blacklist: impl IntoIterator<Item = String>) -> Self {
        Self {
            offline_settings,
            firmware_blacklist: firmware_blacklist.into_iter().collect(),
            serial: FragmentAssembler::new(),
        }
    }

    fn set_firmware(&self, cx: &mut Context<'_, SystemInfo>, version: String) {
        let blacklisted = self.firmware_blacklist.contains(&version);
        if blacklisted {
            info!(version = %version, "firmware version is blacklisted");
        }
        cx.set(|m| &mut m.firmware_blacklisted, blacklisted);
        cx.set(|m| &mut m.firmware_version, version);
    }
}

impl Peripheral for SystemInfoPeripheral {
    type Model = SystemInfo;
    type Event = SettingsStateEvent;
    type Intent = SystemInfoIntent;

    const KIND: PeripheralKind = PeripheralKind::SystemInfo;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::COMMON_SETTINGS_STATE];

    fn decode(command: &ProtocolCommand) -> Result<Option<SettingsStateEvent>, dronesync_api::Error> {
        settings::decode(command)
    }

    fn intent(intent: Intent) -> Option<SystemInfoIntent> {
        match intent {
            Intent::SystemInfo(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_attach(&mut self, cx: &mut Context<'_, SystemInfo>) {
        if !self.offline_settings {
            return;
        }
        if let Some(version) = cx.stored::<String>(FIRMWARE_KEY) {
            self.set_firmware(cx, version);
        }
        if let Some(version) = cx.stored::<String>(HARDWARE_KEY) {
            cx.set(|m| &mut m.hardware_version, version);
        }
        if let Some(serial) = cx.stored::<String>(SERIAL_KEY) {
            cx.set(|m| &mut m.serial, serial);
        }
        if let Some(board_id) = cx.stored::<String>(BOARD_ID_KEY) {
            cx.set(|m| &mut m.board_id, board_id);
        }
    }

    fn on_event(&mut self, cx: &mut Context<'_, SystemInfo>, event: SettingsStateEvent) {
        match event {
            SettingsStateEvent::ProductVersion { software, hardware } => {
                cx.persist(FIRMWARE_KEY, &software);
                cx.persist(HARDWARE_KEY, &hardware);
                self.set_firmware(cx, software);
                cx.set(|m| &mut m.hardware_version, hardware);
            }
            SettingsStateEvent::SerialHigh(part) => self.receive_serial(cx, SERIAL_HIGH, part),
            SettingsStateEvent::SerialLow(part) => self.receive_serial(cx, SERIAL_LOW, part),
            SettingsStateEvent::BoardId(board_id) => {
                cx.persist(BOARD_ID_KEY, &board_id);
                cx.set(|m| &mut m.board_id, board_id);
            }
            SettingsStateEvent::ResetChanged => {
                debug!("settings reset acknowledged");
                cx.set(|m| &mut m.reset_settings_in_progress, false);
            }
        }
    }

    fn on_intent(&mut self, cx: &mut Context<'_, SystemInfo>, intent: SystemInfoIntent) -> RequestOutcome {
        let model = cx.model();
        if model.reset_settings_in_progress || model.factory_reset_in_progress {
            return RejectReason::AlreadyInProgress.into();
        }
        let command = match intent {
            SystemInfoIntent::ResetSettings => settings::reset_settings(),
            SystemInfoIntent::FactoryReset => settings::factory_reset(),
        };
        let outcome = cx.request(command);
        if outcome == RequestOutcome::Sent {
            match intent {
                SystemInfoIntent::ResetSettings => cx.set(|m| &mut m.reset_settings_in_progress, true),
                SystemInfoIntent::FactoryReset => cx.set(|m| &mut m.factory_reset_in_progress, true),
            }
        }
        outcome
    }

    fn on_disconnect(&mut self, cx: &mut Context<'_, SystemInfo>) {
        self.serial.reset();
        if self.offline_settings {
            cx.set(|m| &mut m.reset_settings_in_progress, false);
            cx.set(|m| &mut m.factory_reset_in_progress, false);
        } else {
            cx.reset_model();
        }
    }

    fn publish_offline(&self, model: &SystemInfo) -> bool {
        self.offline_settings && model.is_known()
    }
}

impl SystemInfoPeripheral {
    fn receive_serial(&mut self, cx: &mut Context<'_, SystemInfo>, slot: usize, part: String) {
        if let Some(parts) = self.serial.receive(slot, part) {
            let serial = parts.concat();
            cx.persist(SERIAL_KEY, &serial);
            cx.set(|m| &mut m.serial, serial);
        }
    }
}
