//! Continuous tone synthesis
//!
//! The deterrent engine needs one continuous tone generator with a gain stage
//! whose frequency and volume are live-adjustable without restarting the
//! tone. The cpal stream is owned by a dedicated thread because cpal streams
//! are not `Send`; the handle talks to it through atomics (frequency, gain)
//! and a command channel (halt, close).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Tone acquisition and control failures; recoverable at the engine level
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// No output device or the audio context could not be created
    #[error("audio context unavailable: {0}")]
    ContextUnavailable(String),
    /// The tone thread is gone; halt/close had nothing to act on
    #[error("tone generator already released")]
    AlreadyReleased,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sawtooth,
    Sine,
}

/// Factory for continuous tones
pub trait AudioBackend: Send + Sync {
    /// Allocate a tone generator plus gain stage and start it immediately
    fn open_tone(
        &self,
        waveform: Waveform,
        frequency_hz: f32,
        gain: f32,
    ) -> Result<Arc<dyn ToneHandle>, AudioError>;
}

/// Live control over a running tone. Frequency and gain updates take effect
/// without interrupting the output.
pub trait ToneHandle: Send + Sync {
    fn set_frequency(&self, hz: f32);
    fn set_gain(&self, level: f32);
    /// Halt the oscillator output
    fn halt(&self) -> Result<(), AudioError>;
    /// Release the underlying audio context
    fn close(&self) -> Result<(), AudioError>;
}

enum ToneCommand {
    Halt,
    Close,
}

/// Frequency/gain cell shared between the handle and the audio callback
struct ToneParams {
    frequency_bits: AtomicU32,
    gain_bits: AtomicU32,
}

impl ToneParams {
    fn new(frequency_hz: f32, gain: f32) -> Self {
        Self {
            frequency_bits: AtomicU32::new(frequency_hz.to_bits()),
            gain_bits: AtomicU32::new(gain.to_bits()),
        }
    }

    fn frequency(&self) -> f32 {
        f32::from_bits(self.frequency_bits.load(Ordering::Relaxed))
    }

    fn gain(&self) -> f32 {
        f32::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }
}

/// cpal-backed tone factory
pub struct CpalBackend;

impl AudioBackend for CpalBackend {
    fn open_tone(
        &self,
        waveform: Waveform,
        frequency_hz: f32,
        gain: f32,
    ) -> Result<Arc<dyn ToneHandle>, AudioError> {
        let params = Arc::new(ToneParams::new(frequency_hz, gain));
        let (cmd_tx, cmd_rx) = mpsc::channel::<ToneCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let thread_params = params.clone();
        thread::Builder::new()
            .name("tone-output".to_string())
            .spawn(move || run_tone_thread(waveform, thread_params, cmd_rx, ready_tx))
            .map_err(|e| AudioError::ContextUnavailable(e.to_string()))?;

        // Wait for the stream to come up (or fail) before reporting success.
        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Arc::new(CpalTone { params, cmd_tx: parking_lot::Mutex::new(Some(cmd_tx)) })),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AudioError::ContextUnavailable("tone thread did not start".to_string())),
        }
    }
}

struct CpalTone {
    params: Arc<ToneParams>,
    cmd_tx: parking_lot::Mutex<Option<mpsc::Sender<ToneCommand>>>,
}

impl ToneHandle for CpalTone {
    fn set_frequency(&self, hz: f32) {
        self.params.frequency_bits.store(hz.to_bits(), Ordering::Relaxed);
    }

    fn set_gain(&self, level: f32) {
        self.params.gain_bits.store(level.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    fn halt(&self) -> Result<(), AudioError> {
        let guard = self.cmd_tx.lock();
        match guard.as_ref() {
            Some(tx) => tx.send(ToneCommand::Halt).map_err(|_| AudioError::AlreadyReleased),
            None => Err(AudioError::AlreadyReleased),
        }
    }

    fn close(&self) -> Result<(), AudioError> {
        let mut guard = self.cmd_tx.lock();
        match guard.take() {
            Some(tx) => tx.send(ToneCommand::Close).map_err(|_| AudioError::AlreadyReleased),
            None => Err(AudioError::AlreadyReleased),
        }
    }
}

fn run_tone_thread(
    waveform: Waveform,
    params: Arc<ToneParams>,
    cmd_rx: mpsc::Receiver<ToneCommand>,
    ready_tx: mpsc::Sender<Result<(), AudioError>>,
) {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let Some(device) = host.default_output_device() else {
        let _ = ready_tx.send(Err(AudioError::ContextUnavailable("no output device".to_string())));
        return;
    };
    let supported = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::ContextUnavailable(e.to_string())));
            return;
        }
    };

    let sample_rate = supported.sample_rate().0 as f32;
    let channels = supported.channels() as usize;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let mut phase = 0.0f32;
    let osc_params = params;
    let mut next_sample = move || -> f32 {
        let step = osc_params.frequency() / sample_rate;
        phase += step;
        if phase >= 1.0 {
            phase -= 1.0;
        }
        let value = match waveform {
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Sine => (phase * std::f32::consts::TAU).sin(),
        };
        value * osc_params.gain()
    };

    let err_fn = |e: cpal::StreamError| warn!(error = %e, "tone_stream_error");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                for frame in data.chunks_mut(channels) {
                    let value = next_sample();
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_output_stream(
            &config,
            move |data: &mut [i16], _| {
                for frame in data.chunks_mut(channels) {
                    let value = (next_sample() * i16::MAX as f32) as i16;
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_output_stream(
            &config,
            move |data: &mut [u16], _| {
                for frame in data.chunks_mut(channels) {
                    let value = ((next_sample() * 0.5 + 0.5) * u16::MAX as f32) as u16;
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        ),
        other => {
            let _ = ready_tx.send(Err(AudioError::ContextUnavailable(format!(
                "unsupported sample format {other:?}"
            ))));
            return;
        }
    };

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::ContextUnavailable(e.to_string())));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(AudioError::ContextUnavailable(e.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    // Park until told to release; the stream drops (and the context closes)
    // when this thread returns.
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            ToneCommand::Halt => {
                if let Err(e) = stream.pause() {
                    warn!(error = %e, "tone_pause_failed");
                }
            }
            ToneCommand::Close => break,
        }
    }
}
