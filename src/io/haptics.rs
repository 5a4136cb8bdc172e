//! Haptic output

use tracing::debug;

/// Vibration interface; a pattern alternates on/off durations in ms.
/// Cancellation is an explicit zero-length pulse, matching the platform API.
pub trait Haptics: Send + Sync {
    fn vibrate(&self, pattern: &[u64]);

    fn cancel(&self) {
        self.vibrate(&[0]);
    }
}

/// No-op haptics for hosts without a vibration motor
pub struct NullHaptics;

impl Haptics for NullHaptics {
    fn vibrate(&self, pattern: &[u64]) {
        debug!(pattern = ?pattern, "haptics_unsupported");
    }
}
