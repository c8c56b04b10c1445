// ── ardrone3 settings state: motor errors ──

use strum::FromRepr;

use crate::command::{FeatureTag, ProtocolCommand};
use crate::error::Error;
use crate::protocol_enum;

const MOTOR_ERROR_STATE: u16 = 5;
const MOTOR_ERROR_LAST_ERROR: u16 = 7;

/// Motor error as reported by the flight controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum MotorErrorCode {
    NoError = 0,
    Eeprom = 1,
    MotorStalled = 2,
    PropellerSecurity = 3,
    CommLost = 4,
    RcEmergencyStop = 5,
    RealTime = 6,
    MotorSetting = 7,
    Temperature = 8,
    BatteryVoltage = 9,
    LipoCells = 10,
    Mosfet = 11,
    Bootloader = 12,
    Assert = 13,
}

/// Motor bit positions in the `motor_ids` bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum MotorId {
    FrontLeft = 0,
    FrontRight = 1,
    RearRight = 2,
    RearLeft = 3,
}

protocol_enum!(MotorErrorCode, MotorId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotorEvent {
    /// Current error of every motor whose bit is set in `motor_ids`.
    ErrorState {
        motor_ids: u64,
        error: Option<MotorErrorCode>,
    },
    /// Last error observed on any motor, with no motor attribution.
    LastError(Option<MotorErrorCode>),
}

pub fn decode(command: &ProtocolCommand) -> Result<Option<MotorEvent>, Error> {
    if command.feature != FeatureTag::ARDRONE3_SETTINGS_STATE {
        return Ok(None);
    }
    let mut args = command.reader();
    match command.id {
        MOTOR_ERROR_STATE => Ok(Some(MotorEvent::ErrorState {
            motor_ids: args.bitfield()?,
            error: args.enumeration()?,
        })),
        MOTOR_ERROR_LAST_ERROR => Ok(Some(MotorEvent::LastError(args.enumeration()?))),
        _ => Ok(None),
    }
}

/// Encode a motor error state event (device side, used by simulators and tests).
pub fn motor_error_state(motor_ids: u64, error: MotorErrorCode) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::ARDRONE3_SETTINGS_STATE, MOTOR_ERROR_STATE)
        .arg(crate::command::Arg::U64(motor_ids))
        .enum_arg(error)
}

/// Encode a last-error event (device side).
pub fn motor_error_last_error(error: MotorErrorCode) -> ProtocolCommand {
    ProtocolCommand::new(FeatureTag::ARDRONE3_SETTINGS_STATE, MOTOR_ERROR_LAST_ERROR)
        .enum_arg(error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn decodes_error_state() {
        let cmd = motor_error_state(0b0101, MotorErrorCode::Temperature);
        assert_eq!(
            decode(&cmd).unwrap(),
            Some(MotorEvent::ErrorState {
                motor_ids: 0b0101,
                error: Some(MotorErrorCode::Temperature),
            })
        );
    }

    #[test]
    fn decodes_last_error() {
        let cmd = motor_error_last_error(MotorErrorCode::Mosfet);
        assert_eq!(
            decode(&cmd).unwrap(),
            Some(MotorEvent::LastError(Some(MotorErrorCode::Mosfet)))
        );
    }

    #[test]
    fn other_settings_state_commands_are_ignored() {
        let cmd = ProtocolCommand::new(FeatureTag::ARDRONE3_SETTINGS_STATE, 0);
        assert_eq!(decode(&cmd).unwrap(), None);
    }
}
