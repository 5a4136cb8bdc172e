//! Integration tests for configuration loading

use lifeline::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[storage]
settings_file = "/tmp/lifeline-settings.json"
contacts_file = "/tmp/lifeline-contacts.json"

[location]
lat = 12.9716
lng = 77.5946
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.settings_file(), "/tmp/lifeline-settings.json");
    assert_eq!(config.contacts_file(), "/tmp/lifeline-contacts.json");
    assert_eq!(config.fixed_location(), Some((12.9716, 77.5946)));
}

#[test]
fn test_partial_location_is_ignored() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[location]\nlat = 1.0\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(config.fixed_location(), None);
    assert_eq!(config.settings_file(), "data/settings.json");
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.settings_file(), "data/settings.json");
    assert_eq!(config.contacts_file(), "data/contacts.json");
    assert_eq!(config.fixed_location(), None);
}
