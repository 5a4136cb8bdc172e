//! Deterrent signal engine
//!
//! Drives the audible/visual deterrent: a continuous siren tone swept in a
//! triangular pattern, a repeating vibration pulse, and a flash flag the
//! display layer renders as a periodic overlay. Start and stop are atomic
//! over the whole signal set and idempotent; stop releases every acquired
//! resource independently so one failed release never blocks the others.

use crate::domain::types::Support;
use crate::infra::SettingsStore;
use crate::io::{AudioBackend, Haptics, Notice, NoticeSender, PlatformProbe, ToneHandle, Waveform};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Sweep bounds and step: a deterministic triangular sweep between the two
/// bounds, reversing direction exactly at each
pub const SWEEP_FLOOR_HZ: f32 = 600.0;
pub const SWEEP_CEILING_HZ: f32 = 1400.0;
const SWEEP_STEP_HZ: f32 = 35.0;
const SWEEP_TICK: Duration = Duration::from_millis(40);

/// Vibration pulse: on 200 ms / off 80 ms, re-issued on a fixed period
const VIBRATE_PATTERN: [u64; 2] = [200, 80];
const VIBRATE_REPEAT: Duration = Duration::from_millis(300);

/// Engine state as seen by the display layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Stopped,
    Running,
}

/// The deterrent signal state machine
#[derive(Clone)]
pub struct SirenEngine {
    inner: Arc<Inner>,
}

struct Inner {
    running: Mutex<Option<RunningSignal>>,
    settings: Arc<dyn SettingsStore>,
    audio: Arc<dyn AudioBackend>,
    haptics: Arc<dyn Haptics>,
    probe: Arc<dyn PlatformProbe>,
    notices: NoticeSender,
}

/// Resources owned while the signal is live; at most one exists at a time
struct RunningSignal {
    tone: Arc<dyn ToneHandle>,
    sweep_task: JoinHandle<()>,
    vibrate_task: Option<JoinHandle<()>>,
    flash_enabled: bool,
}

impl SirenEngine {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        audio: Arc<dyn AudioBackend>,
        haptics: Arc<dyn Haptics>,
        probe: Arc<dyn PlatformProbe>,
        notices: NoticeSender,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                running: Mutex::new(None),
                settings,
                audio,
                haptics,
                probe,
                notices,
            }),
        }
    }

    pub fn state(&self) -> SignalState {
        if self.inner.running.lock().is_some() {
            SignalState::Running
        } else {
            SignalState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SignalState::Running
    }

    /// Whether the display layer should render the flashing overlay
    pub fn flash_active(&self) -> bool {
        self.inner.running.lock().as_ref().map(|s| s.flash_enabled).unwrap_or(false)
    }

    /// Start the siren. No-op while already running.
    ///
    /// Re-reads the alarm settings immediately before activating so changes
    /// made in settings are honored even if the control surface is stale.
    pub fn start(&self) {
        let mut running = self.inner.running.lock();
        if running.is_some() {
            debug!("alarm_start_ignored_running");
            return;
        }

        let settings = self.inner.settings.read();
        let tone = match self.inner.audio.open_tone(
            Waveform::Sawtooth,
            SWEEP_FLOOR_HZ,
            settings.alarm_volume,
        ) {
            Ok(tone) => tone,
            Err(e) => {
                warn!(error = %e, "alarm_audio_unavailable");
                self.inner.notices.send(Notice::warning(
                    "Audio not allowed",
                    "Please interact with the page and try again.",
                ));
                return;
            }
        };

        // Tone graph is up; only now may the sweep timer start.
        let sweep_task = tokio::spawn(run_sweep(tone.clone()));

        let vibrate_task = if settings.alarm_vibrate
            && self.inner.probe.vibration() != Support::Unsupported
        {
            self.inner.haptics.vibrate(&VIBRATE_PATTERN);
            let haptics = self.inner.haptics.clone();
            Some(tokio::spawn(async move {
                loop {
                    tokio::time::sleep(VIBRATE_REPEAT).await;
                    haptics.vibrate(&VIBRATE_PATTERN);
                }
            }))
        } else {
            None
        };

        info!(
            volume = %settings.alarm_volume,
            flash = %settings.alarm_flash,
            vibrate = %settings.alarm_vibrate,
            "alarm_started"
        );
        self.inner
            .notices
            .send(Notice::info("Deterrent alarm ON", "Tap STOP to end the alarm."));

        *running = Some(RunningSignal {
            tone,
            sweep_task,
            vibrate_task,
            flash_enabled: settings.alarm_flash,
        });
    }

    /// Stop the siren and release every resource. Safe in any state;
    /// repeated calls are harmless.
    pub fn stop(&self) {
        let Some(signal) = self.inner.running.lock().take() else {
            debug!("alarm_stop_ignored");
            return;
        };
        release(self.inner.haptics.as_ref(), signal);
        info!("alarm_stopped");
    }

    /// Adjust the live gain without interrupting the tone or the sweep
    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        if let Some(signal) = self.inner.running.lock().as_ref() {
            signal.tone.set_gain(volume);
            debug!(volume = %volume, "alarm_volume_updated");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Hosting view went away; release whatever is still held.
        if let Some(signal) = self.running.get_mut().take() {
            release(self.haptics.as_ref(), signal);
        }
    }
}

/// Release each resource independently; an error in one step never prevents
/// the remaining steps from running.
fn release(haptics: &dyn Haptics, signal: RunningSignal) {
    signal.sweep_task.abort();
    if let Some(task) = signal.vibrate_task {
        task.abort();
    }
    haptics.cancel();
    if let Err(e) = signal.tone.halt() {
        debug!(error = %e, "alarm_tone_halt_failed");
    }
    if let Err(e) = signal.tone.close() {
        debug!(error = %e, "alarm_tone_close_failed");
    }
}

/// Triangular sweep: step up until the ceiling, reverse, step down until the
/// floor, reverse. Phase always starts at the floor; nothing persists across
/// stop/start cycles.
async fn run_sweep(tone: Arc<dyn ToneHandle>) {
    let mut frequency = SWEEP_FLOOR_HZ;
    let mut ascending = true;
    loop {
        tokio::time::sleep(SWEEP_TICK).await;
        frequency += if ascending { SWEEP_STEP_HZ } else { -SWEEP_STEP_HZ };
        if frequency >= SWEEP_CEILING_HZ {
            frequency = SWEEP_CEILING_HZ;
            ascending = false;
        }
        if frequency <= SWEEP_FLOOR_HZ {
            frequency = SWEEP_FLOOR_HZ;
            ascending = true;
        }
        tone.set_frequency(frequency);
    }
}
