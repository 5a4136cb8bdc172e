//! Services - the two core state machines
//!
//! - `sequencer` - SOS alert dispatch sequence (arm, dispatch, confirm call)
//! - `siren` - deterrent signal engine (siren sweep, vibration, flash)

pub mod sequencer;
pub mod siren;

// Re-export commonly used types
pub use sequencer::{AlertSequencer, SequencerState};
pub use siren::{SignalState, SirenEngine};
