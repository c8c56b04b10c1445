// ── Magnetometer ──
//
// The calibration process is an explicit state machine. The failure flag
// of the latest state report is held back and only surfaced when the
// device reports the process stopped. A failed report carries no
// calibrated axes.

use std::collections::BTreeSet;

use dronesync_api::features::calibration::{self, CalibrationAxis, CalibrationEvent};
use dronesync_api::{FeatureTag, ProtocolCommand};
use tracing::{debug, trace};

use crate::command::{Intent, MagnetometerIntent, RejectReason, RequestOutcome};
use crate::controller::{Context, Peripheral};
use crate::model::{
    Axis, CalibrationOutcome, CalibrationProcess, CalibrationState, Magnetometer, PeripheralKind,
};

#[derive(Debug, Default)]
pub struct MagnetometerPeripheral {
    /// Failure flag of the latest state report. Cleared on start and
    /// stop.
    failure_latched: bool,
}

fn axis(value: CalibrationAxis) -> Option<Axis> {
    match value {
        CalibrationAxis::X => Some(Axis::Roll),
        CalibrationAxis::Y => Some(Axis::Pitch),
        CalibrationAxis::Z => Some(Axis::Yaw),
        CalibrationAxis::None => None,
    }
}

impl Peripheral for MagnetometerPeripheral {
    type Model = Magnetometer;
    type Event = CalibrationEvent;
    type Intent = MagnetometerIntent;

    const KIND: PeripheralKind = PeripheralKind::Magnetometer;
    const FEATURES: &'static [FeatureTag] = &[FeatureTag::COMMON_CALIBRATION_STATE];

    fn decode(command: &ProtocolCommand) -> Result<Option<CalibrationEvent>, dronesync_api::Error> {
        calibration::decode(command)
    }

    fn intent(intent: Intent) -> Option<MagnetometerIntent> {
        match intent {
            Intent::Magnetometer(intent) => Some(intent),
            _ => None,
        }
    }

    fn on_event(&mut self, cx: &mut Context<'_, Magnetometer>, event: CalibrationEvent) {
        match event {
            CalibrationEvent::RequiredState(raw) => {
                let state = match raw {
                    0 => CalibrationState::Calibrated,
                    1 => CalibrationState::Required,
                    2 => CalibrationState::Recommended,
                    _ => {
                        trace!(raw, "unknown calibration required state");
                        return;
                    }
                };
                cx.set(|m| &mut m.calibration_state, Some(state));
            }
            CalibrationEvent::StateChanged { x, y, z, failed } => {
                if !cx.model().process.is_in_progress() {
                    return;
                }
                self.failure_latched = failed;
                let axes: BTreeSet<Axis> = if failed {
                    BTreeSet::new()
                } else {
                    [(x, Axis::Roll), (y, Axis::Pitch), (z, Axis::Yaw)]
                        .into_iter()
                        .filter_map(|(done, axis)| done.then_some(axis))
                        .collect()
                };
                cx.update(|m| match &mut m.process {
                    CalibrationProcess::InProgress {
                        calibrated_axes, ..
                    } if *calibrated_axes != axes => {
                        *calibrated_axes = axes;
                        true
                    }
                    _ => false,
                });
            }
            CalibrationEvent::AxisToCalibrate(Some(value)) => {
                let next = axis(value);
                cx.update(|m| match &mut m.process {
                    CalibrationProcess::InProgress { current_axis, .. } if *current_axis != next => {
                        *current_axis = next;
                        true
                    }
                    _ => false,
                });
            }
            CalibrationEvent::AxisToCalibrate(None) => {
                trace!("unknown calibration axis");
            }
            CalibrationEvent::StartedChanged(true) => {
                if !cx.model().process.is_in_progress() {
                    debug!("magnetometer calibration started");
                    self.failure_latched = false;
                    cx.set(|m| &mut m.process, CalibrationProcess::started());
                }
            }
            CalibrationEvent::StartedChanged(false) => {
                if cx.model().process.is_in_progress() {
                    let outcome = if self.failure_latched {
                        CalibrationOutcome::Failed
                    } else {
                        CalibrationOutcome::Succeeded
                    };
                    self.failure_latched = false;
                    debug!(?outcome, "magnetometer calibration stopped");
                    cx.set(|m| &mut m.process, CalibrationProcess::Stopped { outcome });
                }
            }
        }
    }

    fn on_intent(
        &mut self,
        cx: &mut Context<'_, Magnetometer>,
        intent: MagnetometerIntent,
    ) -> RequestOutcome {
        let in_progress = cx.model().process.is_in_progress();
        match intent {
            MagnetometerIntent::StartCalibration => {
                if in_progress {
                    return RejectReason::AlreadyInProgress.into();
                }
                cx.request(calibration::magneto_calibration(true))
            }
            MagnetometerIntent::CancelCalibration => {
                if !in_progress {
                    return RejectReason::InvalidState.into();
                }
                let outcome = cx.request(calibration::magneto_calibration(false));
                if outcome == RequestOutcome::Sent {
                    self.failure_latched = false;
                    cx.set(
                        |m| &mut m.process,
                        CalibrationProcess::Stopped {
                            outcome: CalibrationOutcome::Cancelled,
                        },
                    );
                }
                outcome
            }
        }
    }

    fn on_disconnect(&mut self, cx: &mut Context<'_, Magnetometer>) {
        self.failure_latched = false;
        cx.reset_model();
    }
}
