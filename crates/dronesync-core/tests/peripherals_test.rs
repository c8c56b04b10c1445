#![allow(clippy::unwrap_used)]
// Per-peripheral behaviour driven through a synchronous `ComponentSet`.

use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use dronesync_api::features::calibration::{self, CalibrationAxis};
use dronesync_api::features::camera::{self, AntiflickerModeCode, AntiflickerValueCode};
use dronesync_api::features::gauge_updater::{self, GaugeDiag, GaugeResult, GaugeState};
use dronesync_api::features::motors::{self, MotorErrorCode};
use dronesync_api::features::security::{self, LogStorageState};
use dronesync_api::features::settings;
use dronesync_api::features::sound::{self, AlertSoundState};
use dronesync_api::{FeatureTag, ProtocolCommand};
use dronesync_core::model::{
    AntiflickerMode, AntiflickerValue, Axis, CalibrationOutcome, CalibrationProcess,
    CalibrationState, GaugeUpdaterState, Motor, MotorError, UnavailabilityReason,
};
use dronesync_core::{
    AntiflickerIntent, BeeperIntent, ComponentSet, DeviceStore, GaugeUpdaterIntent, Intent,
    LinkEvent, LogControlIntent, MagnetometerIntent, MemoryDeviceStore, PeripheralKind,
    RecordingSink, RejectReason, RequestOutcome, SessionConfig, SystemInfoIntent,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Drone {
    set: ComponentSet,
    sink: RecordingSink,
    store: Arc<MemoryDeviceStore>,
}

impl Drone {
    fn new() -> Self {
        Self::with_config(base_config())
    }

    fn with_config(config: SessionConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryDeviceStore::new()))
    }

    fn with_store(config: SessionConfig, store: Arc<MemoryDeviceStore>) -> Self {
        let sink = RecordingSink::new();
        let set = ComponentSet::drone(&config, Arc::new(sink.clone()), store.clone()).unwrap();
        Self { set, sink, store }
    }

    fn connect(&mut self) {
        self.set.handle_link(LinkEvent::WillConnect);
        self.set.handle_link(LinkEvent::DidConnect);
    }

    fn disconnect(&mut self) {
        self.set.handle_link(LinkEvent::DidDisconnect);
    }

    fn receive(&mut self, command: ProtocolCommand) {
        self.set.route(&command);
    }

    fn published(&self, kind: PeripheralKind) -> bool {
        self.set.peripherals().is_published(kind)
    }
}

fn base_config() -> SessionConfig {
    let mut config = SessionConfig::new("drone-1").unwrap();
    config.certificate_upload = false;
    config
}

fn offline_config() -> SessionConfig {
    let mut config = base_config();
    config.offline_settings = true;
    config
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[test]
fn ungated_peripherals_publish_on_connect_and_unpublish_on_disconnect() {
    let mut drone = Drone::new();
    assert!(drone.set.peripherals().published_kinds().is_empty());

    drone.connect();
    let published: BTreeSet<_> = drone.set.peripherals().published_kinds().into_iter().collect();
    assert_eq!(
        published,
        BTreeSet::from([
            PeripheralKind::Beeper,
            PeripheralKind::CopterMotors,
            PeripheralKind::Magnetometer,
            PeripheralKind::Antiflicker,
            PeripheralKind::SystemInfo,
        ])
    );

    drone.disconnect();
    assert!(drone.set.peripherals().published_kinds().is_empty());
}

#[test]
fn unknown_feature_is_a_no_op() {
    let mut drone = Drone::new();
    drone.connect();
    let before = drone.set.peripherals().notification_count::<dronesync_core::model::Beeper>();
    drone.receive(ProtocolCommand::new(FeatureTag(0x4242), 1));
    assert_eq!(
        drone.set.peripherals().notification_count::<dronesync_core::model::Beeper>(),
        before
    );
}

#[test]
fn forget_clears_the_device_store() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(settings::board_id("0x0042"));
    assert!(!drone.store.is_empty());

    drone.set.handle_link(LinkEvent::Forget);
    assert!(drone.store.is_empty());
    assert!(drone.set.peripherals().published_kinds().is_empty());
}

// ── Beeper ──────────────────────────────────────────────────────────

#[test]
fn beeper_requests_require_connection_and_state_change() {
    let mut drone = Drone::new();
    let start = Intent::Beeper(BeeperIntent::StartAlertSound);
    assert_eq!(
        drone.set.execute(start.clone()),
        RequestOutcome::Rejected(RejectReason::NotConnected)
    );

    drone.connect();
    assert_eq!(drone.set.execute(start.clone()), RequestOutcome::Sent);
    assert_eq!(drone.sink.take(), vec![sound::start_alert_sound()]);
    assert!(!drone.set.peripherals().beeper().unwrap().alerting);

    drone.receive(sound::alert_sound_state(AlertSoundState::Playing));
    assert!(drone.set.peripherals().beeper().unwrap().alerting);
    assert_eq!(
        drone.set.execute(start),
        RequestOutcome::Rejected(RejectReason::InvalidState)
    );
}

// ── Copter motors ───────────────────────────────────────────────────

#[test]
fn motor_bitfield_sets_current_errors() {
    let mut drone = Drone::new();
    drone.connect();

    drone.receive(motors::motor_error_state(0b0101, MotorErrorCode::MotorStalled));
    let state = drone.set.peripherals().copter_motors().unwrap();
    assert_eq!(
        state.motors_currently_in_error(),
        BTreeSet::from([Motor::FrontLeft, Motor::RearRight])
    );

    drone.receive(motors::motor_error_state(0b1111, MotorErrorCode::NoError));
    assert!(drone.set.peripherals().copter_motors().unwrap().motors_currently_in_error().is_empty());
}

#[test]
fn motor_error_codes_collapse_onto_model_errors() {
    let mut drone = Drone::new();
    drone.connect();
    for (code, expected) in [
        (MotorErrorCode::Eeprom, MotorError::Other),
        (MotorErrorCode::PropellerSecurity, MotorError::SecurityMode),
        (MotorErrorCode::RcEmergencyStop, MotorError::EmergencyStop),
        (MotorErrorCode::CommLost, MotorError::Other),
        (MotorErrorCode::LipoCells, MotorError::Lipocells),
    ] {
        drone.receive(motors::motor_error_state(0b0001, code));
        let state = drone.set.peripherals().copter_motors().unwrap();
        assert_eq!(state.current_error(Motor::FrontLeft), expected, "{code:?}");
    }
}

#[test]
fn last_error_applies_to_every_motor() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(motors::motor_error_last_error(MotorErrorCode::Temperature));
    let state = drone.set.peripherals().copter_motors().unwrap();
    for motor in [Motor::FrontLeft, Motor::FrontRight, Motor::RearRight, Motor::RearLeft] {
        assert_eq!(state.past_error(motor), MotorError::Temperature);
        assert_eq!(state.latest_error(motor), MotorError::Temperature);
    }
}

// ── Magnetometer ────────────────────────────────────────────────────

#[test]
fn calibration_failure_is_latched_until_stop() {
    let mut drone = Drone::new();
    drone.connect();

    drone.receive(calibration::required_state(1));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().calibration_state,
        Some(CalibrationState::Required)
    );

    drone.receive(calibration::started_changed(true));
    drone.receive(calibration::axis_to_calibrate(CalibrationAxis::Y));
    drone.receive(calibration::state_changed(true, false, false, false));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::InProgress {
            current_axis: Some(Axis::Pitch),
            calibrated_axes: BTreeSet::from([Axis::Roll]),
        }
    );

    // every axis ok but the device flags the calibration as failed
    drone.receive(calibration::axis_to_calibrate(CalibrationAxis::None));
    drone.receive(calibration::state_changed(true, true, true, true));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::InProgress {
            current_axis: None,
            calibrated_axes: BTreeSet::new(),
        }
    );

    drone.receive(calibration::started_changed(false));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::Stopped {
            outcome: CalibrationOutcome::Failed
        }
    );

    // a new process starts with a clean latch
    drone.receive(calibration::started_changed(true));
    drone.receive(calibration::started_changed(false));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::Stopped {
            outcome: CalibrationOutcome::Succeeded
        }
    );
}

#[test]
fn failure_flag_follows_the_latest_state_report() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(calibration::started_changed(true));
    drone.receive(calibration::state_changed(true, false, false, true));
    drone.receive(calibration::state_changed(true, true, true, false));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::InProgress {
            current_axis: None,
            calibrated_axes: BTreeSet::from([Axis::Roll, Axis::Pitch, Axis::Yaw]),
        }
    );
    drone.receive(calibration::started_changed(false));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::Stopped {
            outcome: CalibrationOutcome::Succeeded
        }
    );
}

#[test]
fn unknown_required_state_keeps_previous_value() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(calibration::required_state(2));
    drone.receive(calibration::required_state(9));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().calibration_state,
        Some(CalibrationState::Recommended)
    );
}

#[test]
fn calibration_cancel_is_surfaced_immediately() {
    let mut drone = Drone::new();
    drone.connect();
    let cancel = Intent::Magnetometer(MagnetometerIntent::CancelCalibration);
    assert_eq!(
        drone.set.execute(cancel.clone()),
        RequestOutcome::Rejected(RejectReason::InvalidState)
    );

    assert_eq!(
        drone.set.execute(Intent::Magnetometer(MagnetometerIntent::StartCalibration)),
        RequestOutcome::Sent
    );
    drone.receive(calibration::started_changed(true));
    assert_eq!(
        drone.set.execute(Intent::Magnetometer(MagnetometerIntent::StartCalibration)),
        RequestOutcome::Rejected(RejectReason::AlreadyInProgress)
    );

    assert_eq!(drone.set.execute(cancel), RequestOutcome::Sent);
    drone.receive(calibration::started_changed(false));
    assert_eq!(
        drone.set.peripherals().magnetometer().unwrap().process,
        CalibrationProcess::Stopped {
            outcome: CalibrationOutcome::Cancelled
        }
    );
    assert_eq!(
        drone.sink.take(),
        vec![
            calibration::magneto_calibration(true),
            calibration::magneto_calibration(false)
        ]
    );
}

// ── Battery gauge updater ───────────────────────────────────────────

#[test]
fn gauge_updater_is_gated_on_updatable_diag() {
    let mut drone = Drone::new();
    drone.connect();
    assert!(!drone.published(PeripheralKind::BatteryGaugeUpdater));

    drone.receive(gauge_updater::status(GaugeDiag::UpToDate, 0, GaugeState::ReadyToPrepare));
    assert!(!drone.published(PeripheralKind::BatteryGaugeUpdater));

    drone.receive(gauge_updater::status(GaugeDiag::Updatable, 0b011, GaugeState::ReadyToPrepare));
    let updater = drone.set.peripherals().battery_gauge_updater().unwrap();
    assert_eq!(
        updater.unavailability_reasons,
        BTreeSet::from([
            UnavailabilityReason::NotUsbPowered,
            UnavailabilityReason::InsufficientCharge
        ])
    );
    assert_eq!(
        drone.set.execute(Intent::BatteryGaugeUpdater(GaugeUpdaterIntent::PrepareUpdate)),
        RequestOutcome::Rejected(RejectReason::InvalidState)
    );
}

#[test]
fn gauge_preparation_progress_and_battery_error() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(gauge_updater::status(GaugeDiag::Updatable, 0, GaugeState::ReadyToPrepare));

    // progress outside preparation is ignored
    drone.receive(gauge_updater::progress(GaugeResult::InProgress, 30));
    assert_eq!(drone.set.peripherals().battery_gauge_updater().unwrap().progress, 0);

    assert_eq!(
        drone.set.execute(Intent::BatteryGaugeUpdater(GaugeUpdaterIntent::PrepareUpdate)),
        RequestOutcome::Sent
    );
    assert_eq!(drone.sink.take(), vec![gauge_updater::prepare()]);

    drone.receive(gauge_updater::status(GaugeDiag::Updatable, 0, GaugeState::PreparationInProgress));
    drone.receive(gauge_updater::progress(GaugeResult::InProgress, 40));
    let updater = drone.set.peripherals().battery_gauge_updater().unwrap();
    assert_eq!(updater.state, GaugeUpdaterState::PreparingUpdate);
    assert_eq!(updater.progress, 40);

    drone.receive(gauge_updater::progress(GaugeResult::BatteryError, 40));
    assert_eq!(
        drone.set.peripherals().battery_gauge_updater().unwrap().state,
        GaugeUpdaterState::Error
    );
}

// ── Antiflicker ─────────────────────────────────────────────────────

#[test]
fn antiflicker_set_mode_reconciles_with_device() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(camera::antiflicker_capabilities(0b0111));
    drone.receive(camera::antiflicker_mode(AntiflickerModeCode::Off, AntiflickerValueCode::Off));

    let set_auto = Intent::Antiflicker(AntiflickerIntent::SetMode(AntiflickerMode::Auto));
    assert_eq!(
        drone.set.execute(set_auto),
        RequestOutcome::Rejected(RejectReason::Unsupported)
    );

    let set_50 = Intent::Antiflicker(AntiflickerIntent::SetMode(AntiflickerMode::Hz50));
    assert_eq!(drone.set.execute(set_50), RequestOutcome::Sent);
    assert_eq!(
        drone.sink.take(),
        vec![camera::set_antiflicker_mode(AntiflickerModeCode::Mode50Hz)]
    );
    assert_eq!(drone.set.peripherals().antiflicker().unwrap().mode, AntiflickerMode::Off);

    drone.receive(camera::antiflicker_mode(
        AntiflickerModeCode::Mode50Hz,
        AntiflickerValueCode::Value50Hz,
    ));
    let antiflicker = drone.set.peripherals().antiflicker().unwrap();
    assert_eq!(antiflicker.mode, AntiflickerMode::Hz50);
    assert_eq!(antiflicker.value, AntiflickerValue::Hz50);
    assert_eq!(
        drone.store.read("antiflicker.supported_modes"),
        Some(json!(["off", "50hz", "60hz"]))
    );
}

#[test]
fn offline_antiflicker_applies_locally_then_device_wins() {
    let mut drone = Drone::with_config(offline_config());
    drone.connect();
    drone.receive(camera::antiflicker_capabilities(0b1111));
    drone.receive(camera::antiflicker_mode(AntiflickerModeCode::Auto, AntiflickerValueCode::Value50Hz));
    drone.disconnect();

    let antiflicker = drone.set.peripherals().antiflicker().unwrap();
    assert_eq!(antiflicker.value, AntiflickerValue::Unknown);

    let set_60 = Intent::Antiflicker(AntiflickerIntent::SetMode(AntiflickerMode::Hz60));
    assert_eq!(drone.set.execute(set_60), RequestOutcome::AppliedLocally);
    assert_eq!(drone.set.peripherals().antiflicker().unwrap().mode, AntiflickerMode::Hz60);
    assert!(drone.sink.sent().is_empty());

    drone.connect();
    drone.receive(camera::antiflicker_mode(AntiflickerModeCode::Mode50Hz, AntiflickerValueCode::Value50Hz));
    assert_eq!(drone.set.peripherals().antiflicker().unwrap().mode, AntiflickerMode::Hz50);
}

#[test]
fn offline_antiflicker_reloads_supported_modes() {
    let store = Arc::new(MemoryDeviceStore::new());
    store.write("antiflicker.supported_modes", json!(["off", "auto"]));
    store.write("antiflicker.mode", json!("auto"));

    let drone = Drone::with_store(offline_config(), store);
    let antiflicker = drone.set.peripherals().antiflicker().unwrap();
    assert_eq!(
        antiflicker.supported_modes,
        BTreeSet::from([AntiflickerMode::Off, AntiflickerMode::Auto])
    );
    assert_eq!(antiflicker.mode, AntiflickerMode::Auto);
}

// ── Log control ─────────────────────────────────────────────────────

#[test]
fn log_control_follows_capability_bit() {
    let mut drone = Drone::new();
    drone.connect();
    let deactivate = Intent::LogControl(LogControlIntent::DeactivateLogs);
    assert_eq!(
        drone.set.execute(deactivate.clone()),
        RequestOutcome::Rejected(RejectReason::Unsupported)
    );

    drone.receive(security::capabilities(0b1));
    assert!(drone.published(PeripheralKind::LogControl));
    drone.receive(security::log_storage_state(LogStorageState::Enabled));
    assert_eq!(drone.set.peripherals().log_control().unwrap().logs_enabled, Some(true));

    assert_eq!(drone.set.execute(deactivate), RequestOutcome::Sent);
    assert_eq!(drone.sink.take(), vec![security::deactivate_logs()]);

    drone.receive(security::capabilities(0));
    assert!(!drone.published(PeripheralKind::LogControl));
}

// ── System info ─────────────────────────────────────────────────────

#[test]
fn serial_is_composed_from_both_halves_and_persisted() {
    let mut drone = Drone::new();
    drone.connect();
    drone.receive(settings::serial_low("0123"));
    assert_eq!(drone.set.peripherals().system_info().unwrap().serial, "");
    drone.receive(settings::serial_high("PI04"));
    assert_eq!(drone.set.peripherals().system_info().unwrap().serial, "PI040123");
    assert_eq!(drone.store.read("system_info.serial"), Some(json!("PI040123")));
}

#[test]
fn blacklisted_firmware_is_flagged() {
    let mut config = base_config();
    config.firmware_blacklist = vec!["1.2.0".into()];
    let mut drone = Drone::with_config(config);
    drone.connect();
    drone.receive(settings::product_version("1.2.0", "HW_02"));
    let info = drone.set.peripherals().system_info().unwrap();
    assert!(info.firmware_blacklisted);
    assert_eq!(info.hardware_version, "HW_02");
}

#[test]
fn reset_settings_progress_ends_on_ack_or_disconnect() {
    let mut drone = Drone::new();
    drone.connect();
    let reset = Intent::SystemInfo(SystemInfoIntent::ResetSettings);
    assert_eq!(drone.set.execute(reset.clone()), RequestOutcome::Sent);
    assert!(drone.set.peripherals().system_info().unwrap().reset_settings_in_progress);
    assert_eq!(
        drone.set.execute(Intent::SystemInfo(SystemInfoIntent::FactoryReset)),
        RequestOutcome::Rejected(RejectReason::AlreadyInProgress)
    );

    drone.receive(settings::reset_changed());
    assert!(!drone.set.peripherals().system_info().unwrap().reset_settings_in_progress);

    assert_eq!(
        drone.set.execute(Intent::SystemInfo(SystemInfoIntent::FactoryReset)),
        RequestOutcome::Sent
    );
    drone.disconnect();
    assert_eq!(
        drone.set.execute(reset),
        RequestOutcome::Rejected(RejectReason::NotConnected)
    );
}

#[test]
fn offline_system_info_is_published_before_first_connection() {
    let store = Arc::new(MemoryDeviceStore::new());
    store.write("system_info.serial", json!("PI040123"));
    store.write("system_info.firmware_version", json!("7.1.0"));

    let mut drone = Drone::with_store(offline_config(), store);
    let info = drone.set.peripherals().system_info().unwrap();
    assert_eq!(info.serial, "PI040123");
    assert_eq!(info.firmware_version, "7.1.0");

    drone.connect();
    drone.disconnect();
    assert!(drone.published(PeripheralKind::SystemInfo));
}

#[test]
fn without_offline_settings_nothing_is_reloaded() {
    let store = Arc::new(MemoryDeviceStore::new());
    store.write("system_info.serial", json!("PI040123"));
    let drone = Drone::with_store(base_config(), store);
    assert!(!drone.published(PeripheralKind::SystemInfo));
}
