use serde::{Deserialize, Serialize};

/// Identity and maintenance state of the drone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub firmware_version: String,
    pub hardware_version: String,
    pub serial: String,
    pub board_id: String,
    pub firmware_blacklisted: bool,
    pub reset_settings_in_progress: bool,
    pub factory_reset_in_progress: bool,
}

impl SystemInfo {
    /// Whether any identifier has been learned yet.
    pub fn is_known(&self) -> bool {
        !self.firmware_version.is_empty() || !self.serial.is_empty() || !self.board_id.is_empty()
    }
}
