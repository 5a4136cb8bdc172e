//! Alert payload composition
//!
//! Pure functions that build the human-readable emergency message. The
//! template is fixed; recipients rely on its exact shape, so every piece
//! (header, map link, timestamp format, personal block) is reproduced
//! verbatim and covered by tests.

use crate::domain::types::{GeoPoint, PersonalDetails, Region};
use chrono::{DateTime, Local};

/// Literal substituted when the coordinate could not be resolved
pub const LOCATION_UNAVAILABLE: &str = "Location unavailable";

/// Subject line used for the email channel
pub const EMAIL_SUBJECT: &str = "Emergency Alert";

/// Google Maps link for a resolved coordinate
pub fn map_link(point: GeoPoint) -> String {
    format!("https://maps.google.com/?q={},{}", point.lat, point.lng)
}

/// Fixed timestamp format: `DD/MM/YYYY, HH:MM:SS` (24-hour, zero-padded, local time)
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%d/%m/%Y, %H:%M:%S").to_string()
}

/// Emergency number resolution: a non-empty custom number always wins,
/// otherwise the region default applies.
pub fn resolve_emergency_number(region: Region, custom_number: &str) -> String {
    let custom = custom_number.trim();
    if custom.is_empty() {
        region.emergency_number().to_string()
    } else {
        custom.to_string()
    }
}

/// Optional personal-details block; only non-empty fields produce lines
pub fn personal_details_block(details: &PersonalDetails) -> Option<String> {
    let details = details.sanitized();
    let mut parts = Vec::new();
    if !details.full_name.is_empty() {
        parts.push(format!("\u{1F464} Name: {}", details.full_name));
    }
    if !details.blood_group.is_empty() {
        parts.push(format!("\u{1FA78} Blood group: {}", details.blood_group));
    }
    if !details.medical_notes.is_empty() {
        parts.push(format!("\u{1F4DD} Notes: {}", details.medical_notes));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Build the full alert payload from its resolved pieces.
///
/// `location_text` is either a [`map_link`] or the [`LOCATION_UNAVAILABLE`]
/// literal; the caller decides which, composition never fails.
pub fn compose_alert(
    location_text: &str,
    timestamp: &str,
    emergency_number: &str,
    details: &PersonalDetails,
) -> String {
    let personal_section = match personal_details_block(details) {
        Some(block) => format!("\n\n{}", block),
        None => String::new(),
    };
    format!(
        "\u{1F6A8} EMERGENCY ALERT \u{1F6A8}\n\
         I am in danger and need immediate help.\n\
         \n\
         \u{1F4CD} My location: {location_text}\n\
         \u{1F550} Time: {timestamp}{personal_section}\n\
         \n\
         Please contact me immediately or send help to my location.\n\
         \u{260E}\u{FE0F} Emergency number: {emergency_number}"
    )
}
