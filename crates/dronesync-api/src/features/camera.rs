// ── camera feature: antiflicker ──

use strum::FromRepr;

use crate::command::{Arg, FeatureTag, ProtocolCommand};
use crate::error::Error;
use crate::protocol_enum;

const ANTIFLICKER_CAPABILITIES: u16 = 24;
const ANTIFLICKER_MODE: u16 = 25;
const SET_ANTIFLICKER_MODE: u16 = 26;

/// Antiflicker setting as the camera understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum AntiflickerModeCode {
    Off = 0,
    Mode50Hz = 1,
    Mode60Hz = 2,
    Auto = 3,
}

/// Frequency actually applied by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum AntiflickerValueCode {
    Off = 0,
    Value50Hz = 1,
    Value60Hz = 2,
}

protocol_enum!(AntiflickerModeCode, AntiflickerValueCode);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraEvent {
    /// Supported modes, as a bitfield of [`AntiflickerModeCode`].
    AntiflickerCapabilities(u64),
    AntiflickerMode {
        mode: Option<AntiflickerModeCode>,
        value: Option<AntiflickerValueCode>,
    },
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<CameraEvent>, Error> {
    if command.feature != FeatureTag::CAMERA {
        return Ok(None);
    }
    let mut args = command.reader();
    match command.id {
        ANTIFLICKER_CAPABILITIES => Ok(Some(CameraEvent::AntiflickerCapabilities(
            args.bitfield()?,
        ))),
        ANTIFLICKER_MODE => Ok(Some(CameraEvent::AntiflickerMode {
            mode: args.enumeration()?,
            value: args.enumeration()?,
        })),
        _ => Ok(None),
    }
}

pub fn set_antiflicker_mode(mode: AntiflickerModeCode) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::CAMERA, SET_ANTIFLICKER_MODE).enum_arg(mode)
}

/// Encode a capabilities event (device side).
pub fn antiflicker_capabilities(supported: u64) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::CAMERA, ANTIFLICKER_CAPABILITIES).arg(Arg::U64(supported))
}

/// Encode a mode event (device side).
pub fn antiflicker_mode(mode: AntiflickerModeCode, value: AntiflickerValueCode) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::CAMERA, ANTIFLICKER_MODE)
        .enum_arg(mode)
        .enum_arg(value)
}
