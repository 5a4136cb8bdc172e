//! Domain models - core business types and the alert payload composer
//!
//! This module contains the canonical data types used throughout the system:
//! - `Region`, `PersonalDetails`, `Contact` - persisted user data read by the core
//! - `GeoPoint` - resolved coordinate from the location provider
//! - `OsFamily`, `Support` - platform capability probe results
//! - `message` - pure composition of the emergency alert payload

pub mod message;
pub mod types;
