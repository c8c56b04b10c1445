use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AntiflickerMode {
    #[default]
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "50hz")]
    Hz50,
    #[serde(rename = "60hz")]
    Hz60,
    #[serde(rename = "auto")]
    Auto,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AntiflickerValue {
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "50hz")]
    Hz50,
    #[serde(rename = "60hz")]
    Hz60,
}

/// Camera antiflicker setting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Antiflicker {
    /// Requested mode.
    pub mode: AntiflickerMode,
    /// Frequency actually applied.
    pub value: AntiflickerValue,
    pub supported_modes: BTreeSet<AntiflickerMode>,
}
