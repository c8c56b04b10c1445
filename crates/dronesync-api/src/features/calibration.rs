// ── common calibration / calibration state ──

use strum::FromRepr;

use crate::command::{Arg, FeatureTag, ProtocolCommand};
use crate::error::Error;
use crate::protocol_enum;

const MAGNETO_CALIBRATION: u16 = 0;

const STATE_CHANGED: u16 = 0;
const REQUIRED_STATE: u16 = 1;
const AXIS_TO_CALIBRATE: u16 = 2;
const STARTED_CHANGED: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum CalibrationAxis {
    X = 0,
    Y = 1,
    Z = 2,
    None = 3,
}

protocol_enum!(CalibrationAxis);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalibrationEvent {
    /// Per-axis calibration flags and the failure flag.
    StateChanged {
        x: bool,
        y: bool,
        z: bool,
        failed: bool,
    },
    /// 0 = calibrated, 1 = required, 2 = recommended.
    RequiredState(u8),
    AxisToCalibrate(Option<CalibrationAxis>),
    StartedChanged(bool),
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<CalibrationEvent>, Error> {
    if command.feature != FeatureTag::COMMON_CALIBRATION_STATE {
        return Ok(None);
    }
    let mut args = command.reader();
    let event = match command.id {
        STATE_CHANGED => CalibrationEvent::StateChanged {
            x: args.u8()? == 1,
            y: args.u8()? == 1,
            z: args.u8()? == 1,
            failed: args.u8()? == 1,
        },
        REQUIRED_STATE => CalibrationEvent::RequiredState(args.u8()?),
        AXIS_TO_CALIBRATE => CalibrationEvent::AxisToCalibrate(args.enumeration()?),
        STARTED_CHANGED => CalibrationEvent::StartedChanged(args.u8()? == 1),
        _ => return Ok(None),
    };
    Ok(Some(event))
}

/// Start (`true`) or abort (`false`) the magnetometer calibration.
pub fn magneto_calibration(start: bool) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_CALIBRATION, MAGNETO_CALIBRATION)
        .arg(Arg::U8(u8::from(start)))
}

/// Encode a calibration state event (device side).
pub fn state_changed(x: bool, y: bool, z: bool, failed: bool) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_CALIBRATION_STATE, STATE_CHANGED)
        .arg(Arg::U8(u8::from(x)))
        .arg(Arg::U8(u8::from(y)))
        .arg(Arg::U8(u8::from(z)))
        .arg(Arg::U8(u8::from(failed)))
}

/// Encode a required-state event (device side).
pub fn required_state(state: u8) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_CALIBRATION_STATE, REQUIRED_STATE).arg(Arg::U8(state))
}

/// Encode an axis-to-calibrate event (device side).
pub fn axis_to_calibrate(axis: CalibrationAxis) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_CALIBRATION_STATE, AXIS_TO_CALIBRATE).enum_arg(axis)
}

/// Encode a started-changed event (device side).
pub fn started_changed(started: bool) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::COMMON_CALIBRATION_STATE, STARTED_CHANGED)
        .arg(Arg::U8(u8::from(started)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state(id: u16, args: Vec<Arg>) -> ProtocolCommand {
        ProtocolCommand {
            feature: FeatureTag::COMMON_CALIBRATION_STATE,
            id,
            args,
        }
    }

    #[test]
    fn decodes_axis_flags() {
        let cmd = state(
            STATE_CHANGED,
            vec![Arg::U8(1), Arg::U8(0), Arg::U8(1), Arg::U8(0)],
        );
        assert_eq!(
            decode(&cmd).unwrap(),
            Some(CalibrationEvent::StateChanged {
                x: true,
                y: false,
                z: true,
                failed: false,
            })
        );
    }

    #[test]
    fn truncated_state_is_a_decode_error() {
        let cmd = state(STATE_CHANGED, vec![Arg::U8(1)]);
        assert!(decode(&cmd).unwrap_err().is_decode());
    }

    #[test]
    fn calibration_command_encodes_flag() {
        assert_eq!(magneto_calibration(true).args, vec![Arg::U8(1)]);
        assert_eq!(magneto_calibration(false).args, vec![Arg::U8(0)]);
    }
}
