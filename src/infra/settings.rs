//! Persisted alert settings with clamp-on-read semantics
//!
//! Settings are stored as a JSON document owned by the surrounding app; the
//! core only ever reads them. Every read re-parses the document and clamps
//! each field to its valid range, so a corrupted or hand-edited file can
//! never push an out-of-range value into the state machines.

use crate::domain::message::resolve_emergency_number;
use crate::domain::types::{PersonalDetails, Region};
use parking_lot::Mutex;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Default alarm volume applied when the field is missing
const DEFAULT_ALARM_VOLUME: f32 = 0.9;

/// Validated, clamped alert settings snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSettings {
    /// Seconds of cancelable arming before dispatch; 0 means no arming phase
    pub arming_delay_secs: u32,
    pub region: Region,
    /// Overrides the region default when non-empty
    pub custom_emergency_number: String,
    /// Alarm volume in [0, 1]
    pub alarm_volume: f32,
    pub alarm_flash: bool,
    pub alarm_vibrate: bool,
    pub personal_details: PersonalDetails,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            arming_delay_secs: 0,
            region: Region::In,
            custom_emergency_number: String::new(),
            alarm_volume: DEFAULT_ALARM_VOLUME,
            alarm_flash: true,
            alarm_vibrate: true,
            personal_details: PersonalDetails::default(),
        }
    }
}

impl AlertSettings {
    /// The number the dialer intent should call
    pub fn emergency_number(&self) -> String {
        resolve_emergency_number(self.region, &self.custom_emergency_number)
    }

    /// Parse a persisted JSON document, clamping every field.
    /// Unparseable input yields the defaults.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<PersistedSettings>(text) {
            Ok(raw) => raw.clamped(),
            Err(e) => {
                warn!(error = %e, "settings_parse_failed");
                Self::default()
            }
        }
    }
}

/// Raw persisted shape; lenient types so malformed values degrade instead of
/// failing the whole document
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedSettings {
    emergency_delay: Option<f64>,
    region: Option<String>,
    custom_emergency_number: Option<String>,
    alarm_volume: Option<f64>,
    alarm_flash: Option<bool>,
    alarm_vibrate: Option<bool>,
    personal_details: Option<PersonalDetails>,
}

impl PersistedSettings {
    fn clamped(self) -> AlertSettings {
        let arming_delay_secs = match self.emergency_delay {
            Some(d) if d.is_finite() && d > 0.0 => d.floor().min(u32::MAX as f64) as u32,
            _ => 0,
        };
        let alarm_volume = match self.alarm_volume {
            Some(v) if v.is_finite() => v.clamp(0.0, 1.0) as f32,
            Some(_) => 0.0,
            None => DEFAULT_ALARM_VOLUME,
        };
        AlertSettings {
            arming_delay_secs,
            region: Region::from_code(self.region.as_deref().unwrap_or("IN")),
            custom_emergency_number: self
                .custom_emergency_number
                .as_deref()
                .unwrap_or("")
                .trim()
                .to_string(),
            alarm_volume,
            alarm_flash: self.alarm_flash.unwrap_or(true),
            alarm_vibrate: self.alarm_vibrate.unwrap_or(true),
            personal_details: self.personal_details.unwrap_or_default().sanitized(),
        }
    }
}

/// Read interface handed to the core; the core never writes back
pub trait SettingsStore: Send + Sync {
    /// Return a fresh, clamped settings snapshot
    fn read(&self) -> AlertSettings;
}

/// JSON-file-backed settings store
///
/// Re-reads the file on every call so that edits made between operations are
/// always honored. A missing or unreadable file yields the defaults.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for FileSettingsStore {
    fn read(&self) -> AlertSettings {
        match fs::read_to_string(&self.path) {
            Ok(text) => AlertSettings::from_json(&text),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "settings_read_failed");
                AlertSettings::default()
            }
        }
    }
}

/// In-memory settings store for hosts that manage their own persistence
pub struct MemorySettingsStore {
    inner: Mutex<AlertSettings>,
}

impl MemorySettingsStore {
    pub fn new(settings: AlertSettings) -> Self {
        Self { inner: Mutex::new(settings) }
    }

    pub fn set(&self, settings: AlertSettings) {
        *self.inner.lock() = settings;
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self) -> AlertSettings {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let settings = AlertSettings::from_json("{}");
        assert_eq!(settings, AlertSettings::default());
    }

    #[test]
    fn test_garbage_document_yields_defaults() {
        let settings = AlertSettings::from_json("not json at all");
        assert_eq!(settings, AlertSettings::default());
    }

    #[test]
    fn test_negative_delay_clamped_to_zero() {
        let settings = AlertSettings::from_json(r#"{"emergencyDelay": -7}"#);
        assert_eq!(settings.arming_delay_secs, 0);
    }

    #[test]
    fn test_fractional_delay_floored() {
        let settings = AlertSettings::from_json(r#"{"emergencyDelay": 5.9}"#);
        assert_eq!(settings.arming_delay_secs, 5);
    }

    #[test]
    fn test_volume_clamped_to_unit_range() {
        let settings = AlertSettings::from_json(r#"{"alarmVolume": 3.5}"#);
        assert_eq!(settings.alarm_volume, 1.0);

        let settings = AlertSettings::from_json(r#"{"alarmVolume": -0.5}"#);
        assert_eq!(settings.alarm_volume, 0.0);
    }

    #[test]
    fn test_unknown_region_falls_back_to_other() {
        let settings = AlertSettings::from_json(r#"{"region": "mars"}"#);
        assert_eq!(settings.region, Region::Other);
        assert_eq!(settings.emergency_number(), "112");
    }

    #[test]
    fn test_custom_number_overrides_region() {
        let settings =
            AlertSettings::from_json(r#"{"region": "US", "customEmergencyNumber": " 5550123 "}"#);
        assert_eq!(settings.emergency_number(), "5550123");
    }

    #[test]
    fn test_blank_custom_number_uses_region_default() {
        let settings =
            AlertSettings::from_json(r#"{"region": "US", "customEmergencyNumber": "  "}"#);
        assert_eq!(settings.emergency_number(), "911");
    }

    #[test]
    fn test_personal_details_sanitized_on_read() {
        let settings = AlertSettings::from_json(
            r#"{"personalDetails": {"fullName": " Asha ", "bloodGroup": "zz", "medicalNotes": "ok"}}"#,
        );
        assert_eq!(settings.personal_details.full_name, "Asha");
        assert_eq!(settings.personal_details.blood_group, "");
        assert_eq!(settings.personal_details.medical_notes, "ok");
    }

    #[test]
    fn test_memory_store_set_and_read() {
        let store = MemorySettingsStore::new(AlertSettings::default());
        let mut updated = AlertSettings::default();
        updated.arming_delay_secs = 10;
        store.set(updated.clone());
        assert_eq!(store.read(), updated);
    }
}
