// ── Session configuration ──
//
// Built by the config crate (or by hand in tests). Core never reads
// configuration files itself.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Address of the drone's embedded HTTP server on its access point.
pub const DEFAULT_DRONE_URL: &str = "http://192.168.42.1";

/// Everything needed to assemble the controllers of one device.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Stable device identifier; prefixes downloaded files.
    pub device_uid: String,
    /// Keep settings published while disconnected.
    pub offline_settings: bool,
    /// Firmware versions flagged as blacklisted in system info.
    pub firmware_blacklist: Vec<String>,
    pub drone_url: Url,
    pub http_timeout: Duration,
    /// `None` disables the flight log downloader.
    pub flight_logs: Option<FlightLogConfig>,
    /// Include the certificate uploader.
    pub certificate_upload: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightLogConfig {
    /// Local directory receiving downloaded records.
    pub work_dir: PathBuf,
    pub transport: FlightLogTransport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightLogTransport {
    /// Drone REST API.
    Http,
    /// File transfer from `remote_dir`, mirrored under `mirror_root`.
    Ftp {
        mirror_root: PathBuf,
        remote_dir: String,
    },
}

impl SessionConfig {
    pub fn new(device_uid: impl Into<String>) -> Result<Self, CoreError> {
        let drone_url = Url::parse(DEFAULT_DRONE_URL).map_err(|e| CoreError::Config {
            message: format!("default drone url: {e}"),
        })?;
        Ok(Self {
            device_uid: device_uid.into(),
            offline_settings: false,
            firmware_blacklist: Vec::new(),
            drone_url,
            http_timeout: Duration::from_secs(30),
            flight_logs: None,
            certificate_upload: true,
        })
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.device_uid.trim().is_empty() {
            return Err(CoreError::Config {
                message: "device uid must not be empty".into(),
            });
        }
        if self.device_uid.contains(['/', '\\']) {
            return Err(CoreError::Config {
                message: format!("device uid '{}' must not contain path separators", self.device_uid),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let config = SessionConfig::new("drone-1").unwrap();
        assert!(!config.offline_settings);
        assert!(config.flight_logs.is_none());
        assert_eq!(config.drone_url.as_str(), "http://192.168.42.1/");
        config.validate().unwrap();
    }

    #[test]
    fn uid_with_separator_is_rejected() {
        let config = SessionConfig::new("../etc").unwrap();
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }
}
