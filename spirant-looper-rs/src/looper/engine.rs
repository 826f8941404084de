use super::buffer::SampleBuffer;
use super::control::{ControlFrame, ControlId};
use super::error::LooperError;
use super::mix::{mix, MixParams};
use super::snapshot::LoopSnapshot;
use super::CONTROL_COUNT;

/// Discrete transport events, produced by the control surface.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopEvent {
    /// Clear switch held long enough: wipe the loop.
    Clear = 0,
    /// Clear switch released after a clear.
    ClearReleased = 1,
    /// Record switch held while stopped: arm synchronized start.
    RecordHeld = 2,
    /// Record switch tapped.
    RecordToggle = 3,
    /// Play switch held: restart playback from the top, decoupled from recording.
    PlayHeld = 4,
    /// Play switch tapped.
    PlayToggle = 5,
}

impl LoopEvent {
    /// Order in which events from one control block are applied.
    pub const ORDER: [LoopEvent; 6] = [
        LoopEvent::Clear,
        LoopEvent::ClearReleased,
        LoopEvent::RecordHeld,
        LoopEvent::RecordToggle,
        LoopEvent::PlayHeld,
        LoopEvent::PlayToggle,
    ];

    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Whether the loop length is still being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LengthState {
    /// No loop recorded yet. The next recording is a first pass.
    Open,
    /// Length fixed by a completed first pass.
    Fixed,
}

/// Transport mode.
///
/// A first pass can only exist while recording, and a recording onto a
/// fixed loop is always an overdub; [`LoopMode::new`] derives the right
/// variant from the length state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopMode {
    Idle,
    Playing,
    /// Capturing while the loop length is measured.
    RecordingFirstPass { playing: bool },
    /// Capturing onto a loop of fixed length.
    RecordingOverdub { playing: bool },
}

impl LoopMode {
    pub fn new(recording: bool, playing: bool, length: LengthState) -> Self {
        match (recording, length) {
            (false, _) if playing => LoopMode::Playing,
            (false, _) => LoopMode::Idle,
            (true, LengthState::Open) => LoopMode::RecordingFirstPass { playing },
            (true, LengthState::Fixed) => LoopMode::RecordingOverdub { playing },
        }
    }

    pub fn is_recording(self) -> bool {
        matches!(
            self,
            LoopMode::RecordingFirstPass { .. } | LoopMode::RecordingOverdub { .. }
        )
    }

    pub fn is_playing(self) -> bool {
        match self {
            LoopMode::Idle => false,
            LoopMode::Playing => true,
            LoopMode::RecordingFirstPass { playing } | LoopMode::RecordingOverdub { playing } => {
                playing
            }
        }
    }

    pub fn is_first_pass(self) -> bool {
        matches!(self, LoopMode::RecordingFirstPass { .. })
    }
}

/// The loop recorder: sample storage, transport state and mixer gains.
///
/// One instance exists per device. The audio interrupt owns it mutably
/// and calls [`process_block`](Self::process_block); the display only
/// sees [`snapshot`](Self::snapshot)s.
///
/// # Examples
///
/// ```
/// use spirant::looper::{ControlFrame, LoopEngine, LoopEvent};
///
/// let mut storage = [0.0f32; 64];
/// let mut engine = LoopEngine::new(&mut storage).unwrap();
///
/// // Record ten frames, then stop: the loop is ten samples long.
/// engine.handle_event(LoopEvent::RecordToggle);
/// for _ in 0..10 {
///     engine.tick(0.5);
/// }
/// engine.handle_event(LoopEvent::RecordToggle);
/// assert_eq!(engine.loop_length(), 10);
/// assert!(!engine.is_first_pass());
/// ```
pub struct LoopEngine<'a> {
    buffer: SampleBuffer<'a>,
    mode: LoopMode,
    length: LengthState,
    play_cursor: usize,
    record_cursor: usize,
    /// Always in `1..=capacity`.
    loop_length: usize,
    recording_length: usize,
    /// Record cursor walks on its own instead of following playback.
    desynced: bool,
    /// Next record start also starts playback.
    sync_armed: bool,
    /// `Some(was_playing)` between a clear and the release of the clear switch.
    resume_playing: Option<bool>,
    mix: MixParams,
    values: [f32; CONTROL_COUNT],
    selected: usize,
}

impl<'a> LoopEngine<'a> {
    /// Build an engine over `storage` and reset it (zeroing the storage).
    ///
    /// Returns [`LooperError::EmptyBuffer`] if `storage` is empty.
    pub fn new(storage: &'a mut [f32]) -> Result<Self, LooperError> {
        let buffer = SampleBuffer::new(storage)?;
        let capacity = buffer.capacity();
        let values = ControlFrame::default().values;
        let mut engine = Self {
            buffer,
            mode: LoopMode::Idle,
            length: LengthState::Open,
            play_cursor: 0,
            record_cursor: 0,
            loop_length: capacity,
            recording_length: 0,
            desynced: false,
            sync_armed: false,
            resume_playing: None,
            mix: mix_params(&values),
            values,
            selected: 0,
        };
        engine.reset();
        Ok(engine)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn mode(&self) -> LoopMode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.mode.is_recording()
    }

    pub fn is_playing(&self) -> bool {
        self.mode.is_playing()
    }

    /// `true` until a first pass has fixed the loop length.
    pub fn is_first_pass(&self) -> bool {
        self.length == LengthState::Open
    }

    pub fn length_state(&self) -> LengthState {
        self.length
    }

    pub fn play_cursor(&self) -> usize {
        self.play_cursor
    }

    pub fn record_cursor(&self) -> usize {
        self.record_cursor
    }

    pub fn loop_length(&self) -> usize {
        self.loop_length
    }

    pub fn recording_length(&self) -> usize {
        self.recording_length
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn is_desynced(&self) -> bool {
        self.desynced
    }

    pub fn is_sync_armed(&self) -> bool {
        self.sync_armed
    }

    /// `true` while the clear switch is still held after a clear.
    pub fn is_resetting(&self) -> bool {
        self.resume_playing.is_some()
    }

    pub fn selected_parameter(&self) -> usize {
        self.selected
    }

    pub fn buffer(&self) -> &SampleBuffer<'a> {
        &self.buffer
    }

    // ── Block-rate control ───────────────────────────────────────────

    /// Process one audio block.
    ///
    /// Applies `frame` first (values, selection, then events in
    /// [`LoopEvent::ORDER`]), then runs [`tick`](Self::tick) for each input
    /// sample and writes the result to both output channels. Processes
    /// `min(input.len(), left.len(), right.len())` frames.
    pub fn process_block(
        &mut self,
        frame: &ControlFrame,
        input: &[f32],
        left: &mut [f32],
        right: &mut [f32],
    ) {
        self.apply_controls(frame);

        for ((&sample, l), r) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
            let out = self.tick(sample);
            *l = out;
            *r = out;
        }
    }

    /// Apply one control frame without processing audio.
    pub fn apply_controls(&mut self, frame: &ControlFrame) {
        self.set_values(frame.values);
        if frame.select_delta != 0 {
            self.select_parameter(frame.select_delta);
        }
        for event in frame.events.iter() {
            self.handle_event(event);
        }
    }

    fn set_values(&mut self, values: [f32; CONTROL_COUNT]) {
        self.values = values;
        self.mix = mix_params(&values);
    }

    /// Move the parameter selection by `delta`, wrapping in both directions.
    pub fn select_parameter(&mut self, delta: i32) {
        let step = delta.rem_euclid(CONTROL_COUNT as i32) as usize;
        self.selected = (self.selected + step) % CONTROL_COUNT;
    }

    /// Transport transition function.
    pub fn handle_event(&mut self, event: LoopEvent) {
        let recording = self.mode.is_recording();
        let playing = self.mode.is_playing();

        match event {
            LoopEvent::RecordToggle if recording => {
                if self.mode.is_first_pass() {
                    self.close_first_pass();
                }
                self.mode = LoopMode::new(false, playing, self.length);
                #[cfg(feature = "defmt")]
                defmt::info!("record off, loop length {}", self.loop_length);
            }
            LoopEvent::RecordToggle => {
                let mut playing = playing;
                if !playing && self.sync_armed {
                    playing = true;
                    self.sync_armed = false;
                }
                if self.length == LengthState::Open {
                    // A first pass always starts the loop at the top.
                    self.play_cursor = 0;
                    self.record_cursor = 0;
                    self.recording_length = 0;
                } else if playing && !self.desynced {
                    self.record_cursor = self.play_cursor;
                }
                self.mode = LoopMode::new(true, playing, self.length);
                #[cfg(feature = "defmt")]
                defmt::info!("record on: {}", self.mode);
            }
            LoopEvent::RecordHeld => {
                if !recording && !playing {
                    self.sync_armed = true;
                    #[cfg(feature = "defmt")]
                    defmt::info!("synchronized start armed");
                }
            }
            LoopEvent::PlayToggle => {
                self.mode = LoopMode::new(recording, !playing, self.length);
            }
            LoopEvent::PlayHeld => {
                self.play_cursor = 0;
                self.desynced = true;
                #[cfg(feature = "defmt")]
                defmt::info!("playback restarted, record cursor decoupled");
            }
            LoopEvent::Clear => {
                self.reset();
                self.resume_playing = Some(playing);
                #[cfg(feature = "defmt")]
                defmt::info!("loop cleared");
            }
            LoopEvent::ClearReleased => {
                if let Some(resume) = self.resume_playing.take() {
                    self.mode = LoopMode::new(self.mode.is_recording(), resume, self.length);
                }
            }
        }
    }

    /// Fix the loop length at the end of a first pass.
    ///
    /// A pass that captured nothing leaves the length open, so the loop
    /// length never becomes zero. Cursors that walked past the new end
    /// are folded back into the loop.
    fn close_first_pass(&mut self) {
        if self.recording_length == 0 {
            self.loop_length = self.buffer.capacity();
            return;
        }
        self.loop_length = self.recording_length;
        self.length = LengthState::Fixed;
        self.play_cursor %= self.loop_length;
        self.record_cursor %= self.loop_length;
    }

    /// Modulus for buffer access and cursor movement.
    ///
    /// While the length is open the loop spans the whole buffer, so a first
    /// pass writes one new slot per frame from the top.
    fn wrap_length(&self) -> usize {
        match self.length {
            LengthState::Open => self.buffer.capacity(),
            LengthState::Fixed => self.loop_length,
        }
    }

    /// Return every field to its power-on value and zero the buffer.
    ///
    /// O(capacity): only call from an explicit clear, never per frame.
    pub fn reset(&mut self) {
        self.mode = LoopMode::Idle;
        self.length = LengthState::Open;
        self.play_cursor = 0;
        self.record_cursor = 0;
        self.recording_length = 0;
        self.desynced = false;
        self.sync_armed = false;
        self.resume_playing = None;
        self.buffer.clear();
        self.loop_length = self.buffer.capacity();
    }

    // ── Frame-rate processing ────────────────────────────────────────

    /// Advance one frame and return the mixed output sample.
    #[inline]
    pub fn tick(&mut self, input: f32) -> f32 {
        let recording = self.mode.is_recording();
        let playing = self.mode.is_playing();

        let wrap = self.wrap_length();

        if recording {
            // Overdub onto the slot being written. With the cursors synced
            // this is also the slot under the play cursor.
            let existing = self.buffer.read(self.record_cursor, wrap);
            let value = existing * self.mix.loop_gain + input * self.mix.input_gain;
            self.buffer.write(self.record_cursor, value, wrap);

            if self.mode.is_first_pass() {
                self.recording_length += 1;
            }
        }

        let raw = self.buffer.read(self.play_cursor, wrap);

        if self.mode.is_first_pass() && self.recording_length >= self.buffer.capacity() {
            self.length = LengthState::Fixed;
            self.loop_length = self.buffer.capacity();
            self.recording_length = 0;
            self.mode = LoopMode::new(true, playing, self.length);
            #[cfg(feature = "defmt")]
            defmt::warn!("first pass hit buffer capacity, loop fixed at {}", self.loop_length);
        }

        let wrap = self.wrap_length();

        if playing {
            self.play_cursor = (self.play_cursor + 1) % wrap;
        }

        if recording {
            if playing && !self.desynced {
                self.record_cursor = self.play_cursor;
            } else if self.length == LengthState::Open {
                self.record_cursor = (self.record_cursor + 1) % wrap;
            } else if self.recording_length > 0 {
                self.record_cursor = (self.record_cursor + 1) % self.recording_length;
            } else {
                self.record_cursor = 0;
            }
        }

        mix(raw, input, &self.mix, recording)
    }

    /// Copy of the state the display needs.
    pub fn snapshot(&self) -> LoopSnapshot {
        LoopSnapshot {
            selected: self.selected,
            recording: self.is_recording(),
            playing: self.is_playing(),
            resetting: self.is_resetting(),
            first_pass: self.is_first_pass(),
            values: self.values,
            loop_length: self.loop_length,
            play_cursor: self.play_cursor,
        }
    }
}

fn mix_params(values: &[f32; CONTROL_COUNT]) -> MixParams {
    MixParams {
        mix_level: values[ControlId::Mix.index()],
        input_gain: values[ControlId::InputGain.index()],
        loop_gain: values[ControlId::LoopGain.index()],
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────
