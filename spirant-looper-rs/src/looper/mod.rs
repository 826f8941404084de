//! Real-time loop recorder engine.
//!
//! This module holds everything that runs inside the audio interrupt: the
//! [`SampleBuffer`], the [`LoopEngine`] state machine, the [`mix`] stage,
//! and the control contract ([`ControlFrame`], [`ControlSurface`]) that the
//! encoder task feeds once per audio block. The display side only ever sees
//! a [`LoopSnapshot`].
//!
//! # Architecture
//!
//! ```text
//!  encoders / switches ──► ControlSurface ──► ControlFrame ─┐
//!                                                           ▼
//!  audio in ──► LoopEngine::process_block ──► SampleBuffer ──► mix ──► audio out (L = R)
//!                          │
//!                          └──► LoopSnapshot ──► OLED task
//! ```
//!
//! # Loop length
//!
//! A fresh engine plays over the whole buffer. The first recording
//! measures the loop: it writes from the top of the buffer, one slot per
//! frame, and when record is toggled off the length is fixed at the number
//! of frames captured. Until then the cursors wrap at capacity. If the
//! first pass runs to the end of the buffer it is cut off and the loop is
//! fixed at full capacity. Once fixed, both cursors wrap at the loop length
//! until the next clear.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation. The sample storage is borrowed from the caller
//! (on hardware, a `'static` region in external SDRAM). The optional
//! `defmt` feature logs transport transitions; nothing is logged per frame.

mod buffer;
mod control;
mod engine;
mod error;
mod gesture;
pub mod mix;
mod snapshot;

pub use buffer::SampleBuffer;
pub use control::{
    percent, Control, ControlChange, ControlFrame, ControlId, ControlSurface, ControlValues,
    EventSet, LooperConfig,
};
pub use engine::{LengthState, LoopEngine, LoopEvent, LoopMode};
pub use error::LooperError;
pub use gesture::{GestureEvent, GestureState, GestureTracker};
pub use mix::MixParams;
pub use snapshot::LoopSnapshot;

/// Operating sample rate in Hz.
pub const SAMPLE_RATE: usize = 48_000;

/// Sample capacity of the loop buffer on hardware: five minutes at
/// [`SAMPLE_RATE`].
pub const CAPACITY: usize = SAMPLE_RATE * 60 * 5;

/// Number of continuous controls (one per physical encoder).
pub const CONTROL_COUNT: usize = 4;

/// Short labels for the continuous controls, indexed by [`ControlId`].
pub const CONTROL_LABELS: [&str; CONTROL_COUNT] = ["mix", "in", "loop", "rnd"];

/// Hold time after which a press counts as a long press.
pub const LONG_PRESS_MS: u32 = 1000;
