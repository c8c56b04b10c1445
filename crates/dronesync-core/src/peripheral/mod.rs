// ── Concrete peripherals ──
//
// Each peripheral is a `Peripheral` impl driven by the generic
// `PeripheralController`.

mod antiflicker;
mod battery_gauge_updater;
mod beeper;
mod certificate_uploader;
mod copter_motors;
mod flight_log_downloader;
mod log_control;
mod magnetometer;
mod system_info;

pub use antiflicker::AntiflickerPeripheral;
pub use battery_gauge_updater::BatteryGaugeUpdaterPeripheral;
pub use beeper::BeeperPeripheral;
pub use certificate_uploader::CertificateUploaderPeripheral;
pub use copter_motors::CopterMotorsPeripheral;
pub use flight_log_downloader::FlightLogDownloaderPeripheral;
pub use log_control::LogControlPeripheral;
pub use magnetometer::MagnetometerPeripheral;
pub use system_info::SystemInfoPeripheral;
