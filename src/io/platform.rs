//! Platform capability probing
//!
//! Capability detection on the source platforms is inherently duck-typed, so
//! it is wrapped in an explicit probe that the state machines resolve once
//! per operation and never assume.

use crate::domain::types::{OsFamily, Support};

/// Capability probe resolved fresh at every decision point
pub trait PlatformProbe: Send + Sync {
    /// Which mobile OS family the host identifies as
    fn os_family(&self) -> OsFamily;
    /// Whether the host can issue vibration patterns
    fn vibration(&self) -> Support;
    /// Whether the host can resolve a geolocation
    fn geolocation(&self) -> Support;
}

/// Probe backed by the compile-time host OS
///
/// Desktop hosts report vibration as unsupported and geolocation as unknown;
/// the location provider itself settles the latter at resolve time.
pub struct HostProbe;

impl PlatformProbe for HostProbe {
    fn os_family(&self) -> OsFamily {
        match std::env::consts::OS {
            "android" => OsFamily::Android,
            "ios" => OsFamily::Ios,
            _ => OsFamily::Other,
        }
    }

    fn vibration(&self) -> Support {
        match self.os_family() {
            OsFamily::Android | OsFamily::Ios => Support::Unknown,
            OsFamily::Other => Support::Unsupported,
        }
    }

    fn geolocation(&self) -> Support {
        Support::Unknown
    }
}

/// Fixed-answer probe for tests and embedding hosts
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    pub os_family: OsFamily,
    pub vibration: Support,
    pub geolocation: Support,
}

impl StaticProbe {
    pub fn new(os_family: OsFamily) -> Self {
        Self { os_family, vibration: Support::Supported, geolocation: Support::Supported }
    }
}

impl PlatformProbe for StaticProbe {
    fn os_family(&self) -> OsFamily {
        self.os_family
    }

    fn vibration(&self) -> Support {
        self.vibration
    }

    fn geolocation(&self) -> Support {
        self.geolocation
    }
}
