// ── Peripheral publication store ──
//
// One publication slot per peripheral kind. Controllers write through
// the slots; application code reads snapshots or subscribes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::warn;

use crate::model::{
    Antiflicker, BatteryGaugeUpdater, Beeper, CertificateUploader, CopterMotors,
    FlightLogDownloader, LogControl, Magnetometer, PeripheralKind, SystemInfo,
};
use crate::store::PublicationSlot;
use crate::stream::PeripheralStream;

/// A peripheral model type with a dedicated slot in the store.
pub trait StoredModel: Clone + Serialize + Send + Sync + 'static {
    const KIND: PeripheralKind;

    fn slot(store: &PeripheralStore) -> &Arc<PublicationSlot<Self>>;
}

/// Central publication store for one device's peripherals.
#[derive(Default)]
pub struct PeripheralStore {
    beeper: Arc<PublicationSlot<Beeper>>,
    copter_motors: Arc<PublicationSlot<CopterMotors>>,
    magnetometer: Arc<PublicationSlot<Magnetometer>>,
    battery_gauge_updater: Arc<PublicationSlot<BatteryGaugeUpdater>>,
    antiflicker: Arc<PublicationSlot<Antiflicker>>,
    log_control: Arc<PublicationSlot<LogControl>>,
    certificate_uploader: Arc<PublicationSlot<CertificateUploader>>,
    flight_log_downloader: Arc<PublicationSlot<FlightLogDownloader>>,
    system_info: Arc<PublicationSlot<SystemInfo>>,
}

impl PeripheralStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Generic access ───────────────────────────────────────────────

    /// Current snapshot of `T`, if published.
    pub fn get<T: StoredModel>(&self) -> Option<Arc<T>> {
        T::slot(self).current()
    }

    /// Subscribe to publication changes of `T`.
    pub fn subscribe<T: StoredModel>(&self) -> PeripheralStream<T> {
        PeripheralStream::new(T::slot(self).subscribe())
    }

    /// Notifications sent for `T` so far (publish, update, unpublish).
    pub fn notification_count<T: StoredModel>(&self) -> u64 {
        T::slot(self).notification_count()
    }

    pub fn is_published(&self, kind: PeripheralKind) -> bool {
        self.snapshot_value(kind).is_some()
    }

    /// Kinds currently published, in declaration order.
    pub fn published_kinds(&self) -> Vec<PeripheralKind> {
        PeripheralKind::iter()
            .filter(|kind| self.is_published(*kind))
            .collect()
    }

    /// JSON snapshot of every published peripheral.
    pub fn snapshot_json(&self) -> BTreeMap<PeripheralKind, serde_json::Value> {
        PeripheralKind::iter()
            .filter_map(|kind| self.snapshot_value(kind).map(|value| (kind, value)))
            .collect()
    }

    fn snapshot_value(&self, kind: PeripheralKind) -> Option<serde_json::Value> {
        match kind {
            PeripheralKind::Beeper => json_of(&self.beeper),
            PeripheralKind::CopterMotors => json_of(&self.copter_motors),
            PeripheralKind::Magnetometer => json_of(&self.magnetometer),
            PeripheralKind::BatteryGaugeUpdater => json_of(&self.battery_gauge_updater),
            PeripheralKind::Antiflicker => json_of(&self.antiflicker),
            PeripheralKind::LogControl => json_of(&self.log_control),
            PeripheralKind::CertificateUploader => json_of(&self.certificate_uploader),
            PeripheralKind::FlightLogDownloader => json_of(&self.flight_log_downloader),
            PeripheralKind::SystemInfo => json_of(&self.system_info),
        }
    }

    // ── Named snapshot accessors ─────────────────────────────────────

    pub fn beeper(&self) -> Option<Arc<Beeper>> {
        self.beeper.current()
    }

    pub fn copter_motors(&self) -> Option<Arc<CopterMotors>> {
        self.copter_motors.current()
    }

    pub fn magnetometer(&self) -> Option<Arc<Magnetometer>> {
        self.magnetometer.current()
    }

    pub fn battery_gauge_updater(&self) -> Option<Arc<BatteryGaugeUpdater>> {
        self.battery_gauge_updater.current()
    }

    pub fn antiflicker(&self) -> Option<Arc<Antiflicker>> {
        self.antiflicker.current()
    }

    pub fn log_control(&self) -> Option<Arc<LogControl>> {
        self.log_control.current()
    }

    pub fn certificate_uploader(&self) -> Option<Arc<CertificateUploader>> {
        self.certificate_uploader.current()
    }

    pub fn flight_log_downloader(&self) -> Option<Arc<FlightLogDownloader>> {
        self.flight_log_downloader.current()
    }

    pub fn system_info(&self) -> Option<Arc<SystemInfo>> {
        self.system_info.current()
    }
}

fn json_of<T: Serialize + Send + Sync + 'static>(
    slot: &PublicationSlot<T>,
) -> Option<serde_json::Value> {
    let model = slot.current()?;
    match serde_json::to_value(&*model) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "failed to serialize peripheral snapshot");
            None
        }
    }
}

// ── StoredModel impls ───────────────────────────────────────────────

macro_rules! stored_model {
    ($($ty:ty => $kind:ident, $field:ident;)+) => {
        $(
            impl StoredModel for $ty {
                const KIND: PeripheralKind = PeripheralKind::$kind;

                fn slot(store: &PeripheralStore) -> &Arc<PublicationSlot<Self>> {
                    &store.$field
                }
            }
        )+
    };
}

stored_model! {
    Beeper => Beeper, beeper;
    CopterMotors => CopterMotors, copter_motors;
    Magnetometer => Magnetometer, magnetometer;
    BatteryGaugeUpdater => BatteryGaugeUpdater, battery_gauge_updater;
    Antiflicker => Antiflicker, antiflicker;
    LogControl => LogControl, log_control;
    CertificateUploader => CertificateUploader, certificate_uploader;
    FlightLogDownloader => FlightLogDownloader, flight_log_downloader;
    SystemInfo => SystemInfo, system_info;
}
