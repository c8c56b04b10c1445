//! Shared configuration for dronesync tools.
//!
//! A TOML file in the platform config directory, merged with
//! `DRONESYNC_`-prefixed environment variables, and its translation to
//! `dronesync_core::SessionConfig`. The core never reads files itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use dronesync_core::config::DEFAULT_DRONE_URL;
use dronesync_core::{FlightLogConfig, FlightLogTransport, SessionConfig};

const ENV_PREFIX: &str = "DRONESYNC_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Identifier of the drone this configuration describes.
    #[serde(default = "default_device_uid")]
    pub device_uid: String,

    /// Keep settings published while disconnected.
    #[serde(default)]
    pub offline_settings: bool,

    /// Firmware versions to flag in system info.
    #[serde(default)]
    pub firmware_blacklist: Vec<String>,

    /// Directory of the per-device JSON stores. Platform data dir when unset.
    pub store_dir: Option<PathBuf>,

    #[serde(default)]
    pub drone: DroneSection,

    #[serde(default)]
    pub flight_logs: FlightLogSection,

    #[serde(default)]
    pub certificate: CertificateSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_uid: default_device_uid(),
            offline_settings: false,
            firmware_blacklist: Vec::new(),
            store_dir: None,
            drone: DroneSection::default(),
            flight_logs: FlightLogSection::default(),
            certificate: CertificateSection::default(),
        }
    }
}

/// Drone HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DroneSection {
    #[serde(default = "default_drone_url")]
    pub url: String,

    /// Request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for DroneSection {
    fn default() -> Self {
        Self {
            url: default_drone_url(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Http,
    Ftp,
}

/// Flight log downloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlightLogSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub transport: TransportKind,

    /// Download destination. Platform data dir when unset.
    pub work_dir: Option<PathBuf>,

    /// Remote directory holding records, for the ftp transport.
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,

    /// Local mirror of the device storage, required by the ftp transport.
    pub mirror_root: Option<PathBuf>,
}

impl Default for FlightLogSection {
    fn default() -> Self {
        Self {
            enabled: false,
            transport: TransportKind::default(),
            work_dir: None,
            remote_dir: default_remote_dir(),
            mirror_root: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CertificateSection {
    /// Include the certificate uploader.
    #[serde(default = "default_true")]
    pub upload: bool,
}

impl Default for CertificateSection {
    fn default() -> Self {
        Self { upload: true }
    }
}

fn default_device_uid() -> String {
    "default".into()
}
fn default_drone_url() -> String {
    DEFAULT_DRONE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_remote_dir() -> String {
    "/internal_000/fdr".into()
}
fn default_true() -> bool {
    true
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "dronesync", "dronesync")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory (device stores, downloaded logs).
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("data"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("dronesync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config: Config = figment(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Session translation ─────────────────────────────────────────────

impl Config {
    /// Directory holding `<device_uid>.json` stores.
    pub fn device_store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("devices"))
    }

    /// Build the core session configuration.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let mut session = SessionConfig::new(self.device_uid.clone())
            .map_err(|e| ConfigError::validation("device_uid", e.to_string()))?;

        session.drone_url = self.drone.url.parse().map_err(|_| {
            ConfigError::validation("drone.url", format!("invalid URL: {}", self.drone.url))
        })?;
        if self.drone.timeout == 0 {
            return Err(ConfigError::validation("drone.timeout", "must be positive"));
        }
        session.http_timeout = Duration::from_secs(self.drone.timeout);
        session.offline_settings = self.offline_settings;
        session.firmware_blacklist.clone_from(&self.firmware_blacklist);
        session.certificate_upload = self.certificate.upload;
        session.flight_logs = self.flight_log_config()?;

        session
            .validate()
            .map_err(|e| ConfigError::validation("device_uid", e.to_string()))?;
        Ok(session)
    }

    fn flight_log_config(&self) -> Result<Option<FlightLogConfig>, ConfigError> {
        let logs = &self.flight_logs;
        if !logs.enabled {
            return Ok(None);
        }
        let transport = match logs.transport {
            TransportKind::Http => FlightLogTransport::Http,
            TransportKind::Ftp => {
                let mirror_root = logs.mirror_root.clone().ok_or_else(|| {
                    ConfigError::validation("flight_logs.mirror_root", "required by the ftp transport")
                })?;
                if logs.remote_dir.is_empty() {
                    return Err(ConfigError::validation("flight_logs.remote_dir", "must not be empty"));
                }
                FlightLogTransport::Ftp {
                    mirror_root,
                    remote_dir: logs.remote_dir.clone(),
                }
            }
        };
        let work_dir = logs
            .work_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("flight_logs"));
        Ok(Some(FlightLogConfig { work_dir, transport }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_translate_to_a_plain_session() {
        let mut config = Config::default();
        config.device_uid = "drone-1".into();
        let session = config.to_session_config().unwrap();
        assert_eq!(session.device_uid, "drone-1");
        assert_eq!(session.drone_url.as_str(), "http://192.168.42.1/");
        assert_eq!(session.http_timeout, Duration::from_secs(30));
        assert!(session.certificate_upload);
        assert!(session.flight_logs.is_none());
    }

    #[test]
    fn ftp_transport_requires_a_mirror() {
        let mut config = Config::default();
        config.flight_logs.enabled = true;
        config.flight_logs.transport = TransportKind::Ftp;
        let err = config.to_session_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "flight_logs.mirror_root"));

        config.flight_logs.mirror_root = Some("/mnt/drone".into());
        config.flight_logs.work_dir = Some("/tmp/logs".into());
        let logs = config.to_session_config().unwrap().flight_logs.unwrap();
        assert_eq!(logs.work_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(
            logs.transport,
            FlightLogTransport::Ftp {
                mirror_root: "/mnt/drone".into(),
                remote_dir: "/internal_000/fdr".into(),
            }
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        config.drone.url = "not a url".into();
        assert!(config.to_session_config().is_err());

        let mut config = Config::default();
        config.drone.timeout = 0;
        assert!(config.to_session_config().is_err());

        let mut config = Config::default();
        config.device_uid = "../escape".into();
        assert!(config.to_session_config().is_err());
    }

    #[test]
    fn file_and_environment_are_merged() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                device_uid = "anafi-7"
                offline_settings = true
                firmware_blacklist = ["1.0.0"]

                [flight_logs]
                enabled = true
                "#,
            )?;
            jail.set_env("DRONESYNC_DRONE__TIMEOUT", "5");

            let config = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(config.device_uid, "anafi-7");
            assert!(config.offline_settings);
            assert_eq!(config.firmware_blacklist, vec!["1.0.0".to_string()]);
            assert!(config.flight_logs.enabled);
            assert_eq!(config.flight_logs.transport, TransportKind::Http);
            assert_eq!(config.drone.timeout, 5);
            assert_eq!(config.drone.url, DEFAULT_DRONE_URL);
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }
}
