use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeUpdaterState {
    #[default]
    ReadyToPrepare,
    PreparingUpdate,
    ReadyToUpdate,
    Updating,
    Error,
}

/// Why an update cannot be prepared right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailabilityReason {
    NotUsbPowered,
    InsufficientCharge,
    DroneNotLanded,
}

/// Battery gauge firmware updater.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatteryGaugeUpdater {
    pub state: GaugeUpdaterState,
    /// Preparation progress, in percent.
    pub progress: u8,
    pub unavailability_reasons: BTreeSet<UnavailabilityReason>,
}
