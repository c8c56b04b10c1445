// ── Peripheral domain model ──
//
// One plain data type per peripheral. Each is owned by its controller
// and handed out as immutable `Arc` snapshots through the
// `PeripheralStore`.

mod antiflicker;
mod battery_gauge_updater;
mod beeper;
mod certificate_uploader;
mod copter_motors;
mod flight_log_downloader;
mod log_control;
mod magnetometer;
mod system_info;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

pub use antiflicker::{Antiflicker, AntiflickerMode, AntiflickerValue};
pub use battery_gauge_updater::{BatteryGaugeUpdater, GaugeUpdaterState, UnavailabilityReason};
pub use beeper::Beeper;
pub use certificate_uploader::{CertificateUploader, UploadState};
pub use copter_motors::{CopterMotors, Motor, MotorError, MotorErrorState};
pub use flight_log_downloader::{CompletionStatus, FlightLogDownloader};
pub use log_control::LogControl;
pub use magnetometer::{Axis, CalibrationOutcome, CalibrationProcess, CalibrationState, Magnetometer};
pub use system_info::SystemInfo;

/// Identifies a peripheral, and the controller owning it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PeripheralKind {
    Beeper,
    CopterMotors,
    Magnetometer,
    BatteryGaugeUpdater,
    Antiflicker,
    LogControl,
    CertificateUploader,
    FlightLogDownloader,
    SystemInfo,
}
