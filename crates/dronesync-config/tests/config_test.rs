#![allow(clippy::unwrap_used)]
// Save / load round trip through the filesystem.

use pretty_assertions::assert_eq;

use dronesync_config::{Config, TransportKind, load_config_from, save_config_to};

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/config.toml");

    let mut config = Config::default();
    config.device_uid = "anafi-3".into();
    config.store_dir = Some(dir.path().join("stores"));
    config.flight_logs.enabled = true;
    config.flight_logs.transport = TransportKind::Ftp;
    config.flight_logs.mirror_root = Some(dir.path().join("mirror"));
    config.certificate.upload = false;

    save_config_to(&config, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("transport = \"ftp\""));

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.device_store_dir(), dir.path().join("stores"));
}

#[test]
fn malformed_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "offline_settings = \"sometimes\"").unwrap();
    assert!(load_config_from(&path).is_err());
}
