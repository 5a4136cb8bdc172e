//! IO modules - platform device interfaces
//!
//! This module contains every volatile device capability the core touches:
//! - `location` - one-shot geolocation queries
//! - `channels` - SMS/dialer/email/clipboard intents and deep-link builders
//! - `haptics` - vibration patterns
//! - `audio` - continuous tone synthesis (cpal-backed)
//! - `platform` - OS family and capability probing
//! - `notice` - typed channel of user-visible transient notices

pub mod audio;
pub mod channels;
pub mod haptics;
pub mod location;
pub mod notice;
pub mod platform;

// Re-export commonly used types
pub use audio::{AudioBackend, AudioError, CpalBackend, ToneHandle, Waveform};
pub use channels::{ChannelDispatcher, DispatchError, IntentLogDispatcher};
pub use haptics::{Haptics, NullHaptics};
pub use location::{FixedLocation, LocationError, LocationProvider, NoLocation};
pub use notice::{create_notice_channel, Notice, NoticeSender, NoticeSeverity};
pub use platform::{HostProbe, PlatformProbe, StaticProbe};
