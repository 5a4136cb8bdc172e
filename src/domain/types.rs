//! Shared types for the safety companion core

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Region used to select the default emergency number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    In,
    Us,
    Uk,
    Other,
}

impl Region {
    /// Parse a persisted region code; unknown codes fall back to `Other`
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "IN" => Region::In,
            "US" => Region::Us,
            "UK" => Region::Uk,
            _ => Region::Other,
        }
    }

    /// Default emergency number for this region
    pub fn emergency_number(&self) -> &'static str {
        match self {
            Region::Us => "911",
            Region::Uk => "999",
            Region::In | Region::Other => "112",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::In => "IN",
            Region::Us => "US",
            Region::Uk => "UK",
            Region::Other => "OTHER",
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::In
    }
}

/// Blood groups accepted in personal details; anything else is treated as unknown
pub const ALLOWED_BLOOD_GROUPS: [&str; 8] = ["O+", "O-", "A+", "A-", "B+", "B-", "AB+", "AB-"];

/// Maximum length of the free-form medical notes field
pub const MEDICAL_NOTES_MAX_CHARS: usize = 500;

/// Optional medical details included in the alert payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    #[serde(default)]
    pub full_name: String,
    /// One of [`ALLOWED_BLOOD_GROUPS`] or empty for unknown
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub medical_notes: String,
}

impl PersonalDetails {
    /// Returns a copy with every field trimmed, the blood group validated
    /// against the allowed set and the notes truncated to the field limit.
    pub fn sanitized(&self) -> Self {
        let blood = self.blood_group.trim().to_uppercase();
        let blood_group = if ALLOWED_BLOOD_GROUPS.contains(&blood.as_str()) {
            blood
        } else {
            String::new()
        };
        let notes: String =
            self.medical_notes.trim().chars().take(MEDICAL_NOTES_MAX_CHARS).collect();
        Self {
            full_name: self.full_name.trim().to_string(),
            blood_group,
            medical_notes: notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_empty() && self.blood_group.is_empty() && self.medical_notes.is_empty()
    }
}

/// Emergency contact record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
}

impl Contact {
    /// A contact is reachable if it carries at least one non-empty channel
    pub fn is_reachable(&self) -> bool {
        let has_phone = self.phone.as_deref().is_some_and(|p| !p.trim().is_empty());
        let has_email = self.email.as_deref().is_some_and(|e| !e.trim().is_empty());
        has_phone || has_email
    }
}

/// A resolved geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Mobile OS family, detected by platform sniffing (never configured)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Android,
    Ios,
    Other,
}

impl OsFamily {
    /// Multi-recipient delimiter for the SMS composer.
    /// Android-family composers expect `;`, everything else `,`.
    pub fn sms_recipient_delimiter(&self) -> char {
        match self {
            OsFamily::Android => ';',
            OsFamily::Ios | OsFamily::Other => ',',
        }
    }
}

/// Tri-state result of a capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Supported,
    Unsupported,
    Unknown,
}
