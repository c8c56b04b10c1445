use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationState {
    Calibrated,
    Required,
    Recommended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Roll,
    Pitch,
    Yaw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// Calibration process: not started, in progress, then stopped with an
/// outcome. A failure seen while in progress only shows up in the
/// `Stopped` outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalibrationProcess {
    #[default]
    NotStarted,
    InProgress {
        current_axis: Option<Axis>,
        calibrated_axes: BTreeSet<Axis>,
    },
    Stopped {
        outcome: CalibrationOutcome,
    },
}

impl CalibrationProcess {
    pub(crate) fn started() -> Self {
        Self::InProgress {
            current_axis: None,
            calibrated_axes: BTreeSet::new(),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

/// Three-axis magnetometer with its calibration process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Magnetometer {
    /// `None` until the drone reports it.
    pub calibration_state: Option<CalibrationState>,
    pub process: CalibrationProcess,
}
