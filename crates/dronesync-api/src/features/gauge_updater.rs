// ── gauge_fw_updater feature ──

use strum::FromRepr;

use crate::command::{Arg, FeatureTag, ProtocolCommand};
use crate::error::Error;
use crate::protocol_enum;

const PREPARE: u16 = 0;
const UPDATE: u16 = 1;
const STATUS: u16 = 2;
const PROGRESS: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum GaugeDiag {
    Updatable = 0,
    UpToDate = 1,
}

/// Bits of the `missing_requirements` bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum GaugeRequirement {
    Usb = 0,
    Rsoc = 1,
    DroneState = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum GaugeState {
    ReadyToPrepare = 0,
    PreparationInProgress = 1,
    ReadyToUpdate = 2,
    UpdateInProgress = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum GaugeResult {
    InProgress = 0,
    Success = 1,
    BatteryError = 2,
}

protocol_enum!(GaugeDiag, GaugeRequirement, GaugeState, GaugeResult);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GaugeUpdaterEvent {
    Status {
        diag: Option<GaugeDiag>,
        missing_requirements: u64,
        state: Option<GaugeState>,
    },
    Progress {
        result: Option<GaugeResult>,
        percent: u8,
    },
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<GaugeUpdaterEvent>, Error> {
    if command.feature != FeatureTag::GAUGE_FW_UPDATER {
        return Ok(None);
    }
    let mut args = command.reader();
    match command.id {
        STATUS => Ok(Some(GaugeUpdaterEvent::Status {
            diag: args.enumeration()?,
            missing_requirements: args.bitfield()?,
            state: args.enumeration()?,
        })),
        PROGRESS => Ok(Some(GaugeUpdaterEvent::Progress {
            result: args.enumeration()?,
            percent: args.u8()?,
        })),
        _ => Ok(None),
    }
}

pub fn prepare() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::GAUGE_FW_UPDATER, PREPARE)
}

pub fn update() -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::GAUGE_FW_UPDATER, UPDATE)
}

/// Encode a status event (device side).
pub fn status(diag: GaugeDiag, missing_requirements: u64, state: GaugeState) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::GAUGE_FW_UPDATER, STATUS)
        .enum_arg(diag)
        .arg(Arg::U64(missing_requirements))
        .enum_arg(state)
}

/// Encode a progress event (device side).
pub fn progress(result: GaugeResult, percent: u8) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::GAUGE_FW_UPDATER, PROGRESS)
        .enum_arg(result)
        .arg(Arg::U8(percent))
}
