// ── User intents ──
//
// Every user-initiated operation flows through the `Intent` enum. The
// session routes each intent to the controller of its target peripheral,
// which answers with a `RequestOutcome`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::oneshot;

use crate::model::{AntiflickerMode, PeripheralKind};

/// An intent envelope sent through the session channel.
pub(crate) struct IntentEnvelope {
    pub intent: Intent,
    pub response_tx: oneshot::Sender<RequestOutcome>,
}

/// All user-initiated operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Beeper(BeeperIntent),
    Magnetometer(MagnetometerIntent),
    BatteryGaugeUpdater(GaugeUpdaterIntent),
    Antiflicker(AntiflickerIntent),
    LogControl(LogControlIntent),
    CertificateUploader(CertificateIntent),
    SystemInfo(SystemInfoIntent),
}

impl Intent {
    /// Peripheral the intent is addressed to.
    pub fn target(&self) -> PeripheralKind {
        match self {
            Self::Beeper(_) => PeripheralKind::Beeper,
            Self::Magnetometer(_) => PeripheralKind::Magnetometer,
            Self::BatteryGaugeUpdater(_) => PeripheralKind::BatteryGaugeUpdater,
            Self::Antiflicker(_) => PeripheralKind::Antiflicker,
            Self::LogControl(_) => PeripheralKind::LogControl,
            Self::CertificateUploader(_) => PeripheralKind::CertificateUploader,
            Self::SystemInfo(_) => PeripheralKind::SystemInfo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeeperIntent {
    StartAlertSound,
    StopAlertSound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnetometerIntent {
    StartCalibration,
    CancelCalibration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeUpdaterIntent {
    PrepareUpdate,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiflickerIntent {
    SetMode(AntiflickerMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogControlIntent {
    DeactivateLogs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateIntent {
    Upload { path: PathBuf },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemInfoIntent {
    ResetSettings,
    FactoryReset,
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// Result of handing an intent to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum RequestOutcome {
    /// Command sent to the device; the model changes on confirmation.
    Sent,
    /// Not connected: the model was updated locally, nothing was sent.
    AppliedLocally,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    NotConnected,
    Unsupported,
    InvalidState,
    AlreadyInProgress,
    /// No controller for the target peripheral in this session.
    NoController,
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => f.write_str("sent"),
            Self::AppliedLocally => f.write_str("applied_locally"),
            Self::Rejected(reason) => write!(f, "rejected ({reason})"),
        }
    }
}

impl RequestOutcome {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

impl From<RejectReason> for RequestOutcome {
    fn from(reason: RejectReason) -> Self {
        Self::Rejected(reason)
    }
}
