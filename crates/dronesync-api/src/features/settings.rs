// ── common settings / settings state / factory ──

use crate::command::{Arg, FeatureTag, ProtocolCommand};
use crate::error::Error;

const SETTINGS_RESET: u16 = 1;
const FACTORY_RESET: u16 = 0;

const RESET_CHANGED: u16 = 1;
const PRODUCT_VERSION: u16 = 3;
const SERIAL_HIGH: u16 = 4;
const SERIAL_LOW: u16 = 5;
const BOARD_ID: u16 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsStateEvent {
    /// The device finished resetting its settings.
    ResetChanged,
    ProductVersion { software: String, hardware: String },
    SerialHigh(String),
    SerialLow(String),
    BoardId(String),
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<SettingsStateEvent>, Error> {
    if command.feature != FeatureTag::COMMON_SETTINGS_STATE {
        return Ok(None);
    }
    let mut args = command.reader();
    let event = match command.id {
        RESET_CHANGED => SettingsStateEvent::ResetChanged,
        PRODUCT_VERSION => SettingsStateEvent::ProductVersion {
            software: args.string()?,
            hardware: args.string()?,
        },
        SERIAL_HIGH => SettingsStateEvent::SerialHigh(args.string()?),
        SERIAL_LOW => SettingsStateEvent::SerialLow(args.string()?),
        BOARD_ID => SettingsStateEvent::BoardId(args.string()?),
        _ => return Ok(None),
    };
    Ok(Some(event))
}

pub fn reset_settings() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_SETTINGS, SETTINGS_RESET)
}

pub fn factory_reset() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_FACTORY, FACTORY_RESET)
}

fn string_event(id: u16, value: &str) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_SETTINGS_STATE, id).arg(Arg::Str(value.to_owned()))
}

/// Encode a product version event (device side).
pub fn product_version(software: &str, hardware: &str) -> ProtocolCommand {
    string_event(PRODUCT_VERSION, software).arg(Arg::Str(hardware.to_owned()))
}

/// Encode a serial-high event (device side).
pub fn serial_high(value: &str) -> ProtocolCommand {
    string_event(SERIAL_HIGH, value)
}

/// Encode a serial-low event (device side).
pub fn serial_low(value: &str) -> ProtocolCommand {
    string_event(SERIAL_LOW, value)
}

/// Encode a board id event (device side).
pub fn board_id(value: &str) -> ProtocolCommand {
    string_event(BOARD_ID, value)
}

/// Encode a reset-changed event (device side).
pub fn reset_changed() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_SETTINGS_STATE, RESET_CHANGED)
}
