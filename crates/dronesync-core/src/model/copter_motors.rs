use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Motor {
    FrontLeft,
    FrontRight,
    RearRight,
    RearLeft,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MotorError {
    #[default]
    None,
    Stalled,
    SecurityMode,
    EmergencyStop,
    Temperature,
    BatteryVoltage,
    Lipocells,
    Mosfet,
    Other,
}

/// Error state of a single motor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MotorErrorState {
    /// Error the motor is in right now.
    pub current: MotorError,
    /// Most recent error reported by the drone, not tied to a motor.
    pub past: MotorError,
}

/// Motor error state of a quadcopter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopterMotors {
    pub motors: BTreeMap<Motor, MotorErrorState>,
}

impl Default for CopterMotors {
    fn default() -> Self {
        Self {
            motors: Motor::iter()
                .map(|motor| (motor, MotorErrorState::default()))
                .collect(),
        }
    }
}

impl CopterMotors {
    pub fn current_error(&self, motor: Motor) -> MotorError {
        self.motors.get(&motor).map(|s| s.current).unwrap_or_default()
    }

    pub fn past_error(&self, motor: Motor) -> MotorError {
        self.motors.get(&motor).map(|s| s.past).unwrap_or_default()
    }

    /// Current error if any, otherwise the past one.
    pub fn latest_error(&self, motor: Motor) -> MotorError {
        match self.current_error(motor) {
            MotorError::None => self.past_error(motor),
            current => current,
        }
    }

    pub fn motors_currently_in_error(&self) -> BTreeSet<Motor> {
        self.motors
            .iter()
            .filter(|(_, state)| state.current != MotorError::None)
            .map(|(motor, _)| *motor)
            .collect()
    }
}
