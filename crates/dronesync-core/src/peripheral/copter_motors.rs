// ── Copter motors ──

use dronesync_api::features::motors::{self, MotorErrorCode, MotorEvent, MotorId};
use dronesync_api::{FeatureTag, ProtocolCommand};
use strum::IntoEnumIterator;
use tracing::trace;

use crate::bitfield::BitfieldEnum;
use crate::controller::{Context, Peripheral};
use crate::model::{CopterMotors, Motor, MotorError, PeripheralKind};

impl BitfieldEnum for Motor {
    type Protocol = MotorId;

    fn encode_bit(self) -> MotorId {
        match self {
            Self::FrontLeft => MotorId::FrontLeft,
            Self::FrontRight => MotorId::FrontRight,
            Self::RearRight => MotorId::RearRight,
            Self::RearLeft => MotorId::RearLeft,
        }
    }

    fn from_protocol(value: MotorId) -> Option<Self> {
        Some(match value {
            MotorId::FrontLeft => Self::FrontLeft,
            MotorId::FrontRight => Self::FrontRight,
            MotorId::RearRight => Self::RearRight,
            MotorId::RearLeft => Self::RearLeft,
        })
    }
}

fn motor_error(code: MotorErrorCode) -> MotorError {
    match code {
        MotorErrorCode::NoError => MotorError::None,
        MotorErrorCode::MotorStalled => MotorError::Stalled,
        MotorErrorCode::PropellerSecurity => MotorError::SecurityMode,
        MotorErrorCode::RcEmergencyStop => MotorError::EmergencyStop,
        MotorErrorCode::Temperature => MotorError::Temperature,
        MotorErrorCode::BatteryVoltage => MotorError::BatteryVoltage,
        MotorErrorCode::LipoCells => MotorError::Lipocells,
        MotorErrorCode::Mosfet => MotorError::Mosfet,
        MotorErrorCode::Eeprom
        | MotorErrorCode::CommLost
        | MotorErrorCode::RealTime
        | MotorErrorCode::MotorSetting
        | MotorErrorCode::Bootloader
        | MotorErrorCode::Assert => MotorError::Other,
    }
}

/// Per-motor error reporting.
#[derive(Debug, Default)]
pub struct CopterMotorsPeripheral;

impl Peripheral for CopterMotorsPeripheral {
    type Model = CopterMotors;
    type Event = MotorEvent;
    type Intent = std::convert::Infallible;

    const KIND: PeripheralKind = PeripheralKind::CopterMotors;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::ARDRONE3_SETTINGS_STATE];

    fn decode(command: &ProtocolCommand) -> Result<Option<MotorEvent>, dronesync_api::Error> {
        motors::decode(command)
    }

    fn on_event(&mut self, cx: &mut Context<'_, CopterMotors>, event: MotorEvent) {
        match event {
            MotorEvent::ErrorState {
                motor_ids,
                error: Some(code),
            } => {
                let error = motor_error(code);
                cx.update(|m| {
                    let mut changed = false;
                    for motor in Motor::decode_set(motor_ids) {
                        let state = m.motors.entry(motor).or_default();
                        if state.current != error {
                            state.current = error;
                            changed = true;
                        }
                    }
                    changed
                });
            }
            MotorEvent::LastError(Some(code)) => {
                let error = motor_error(code);
                cx.update(|m| {
                    let mut changed = false;
                    for motor in Motor::iter() {
                        let state = m.motors.entry(motor).or_default();
                        if state.past != error {
                            state.past = error;
                            changed = true;
                        }
                    }
                    changed
                });
            }
            MotorEvent::ErrorState { error: None, .. } | MotorEvent::LastError(None) => {
                trace!("unknown motor error code");
            }
        }
    }
}
