use super::control::percent;
use super::CONTROL_COUNT;

/// Read-only copy of the engine state for the display.
///
/// Taken once per audio block by the audio side and read at leisure by
/// the display task. Fields are plain copies, so a snapshot may be a
/// block stale but is never half-written. Helpers still treat indices
/// defensively because the snapshot can be built by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopSnapshot {
    /// Index of the selected control.
    pub selected: usize,
    pub recording: bool,
    pub playing: bool,
    /// Clear switch still held after a clear.
    pub resetting: bool,
    /// Loop length not fixed yet.
    pub first_pass: bool,
    /// Continuous controls in `[0, 1]`.
    pub values: [f32; CONTROL_COUNT],
    pub loop_length: usize,
    pub play_cursor: usize,
}

impl Default for LoopSnapshot {
    fn default() -> Self {
        Self::power_on()
    }
}

impl LoopSnapshot {
    /// State before the engine has published anything. Usable in a
    /// `static` initializer.
    pub const fn power_on() -> Self {
        Self {
            selected: 0,
            recording: false,
            playing: false,
            resetting: false,
            first_pass: true,
            values: [0.0; CONTROL_COUNT],
            loop_length: 0,
            play_cursor: 0,
        }
    }

    /// Control values as integer percentages.
    pub fn percentages(&self) -> [u8; CONTROL_COUNT] {
        core::array::from_fn(|i| percent(self.values[i]))
    }

    /// Text for the mode line.
    pub fn mode_label(&self) -> &'static str {
        if self.resetting {
            "resetting"
        } else if self.recording {
            "recording"
        } else if self.playing {
            "playing"
        } else {
            "stopped"
        }
    }

    /// Selected control, clamped into range.
    pub fn selected_index(&self) -> usize {
        self.selected.min(CONTROL_COUNT - 1)
    }

    /// Play position as thousandths of the loop, in `0..=1000`.
    ///
    /// Returns 0 for an empty loop and clamps a cursor past the end.
    pub fn progress_permille(&self) -> u16 {
        if self.loop_length == 0 {
            return 0;
        }
        let cursor = self.play_cursor.min(self.loop_length) as u64;
        (cursor * 1000 / self.loop_length as u64) as u16
    }
}
