//! Control contract between the encoder board and the engine.
//!
//! Once per audio block the engine consumes a [`ControlFrame`]: the four
//! continuous controls normalized to `[0, 1]`, a parameter-selection
//! delta, and the set of discrete [`LoopEvent`]s that fired since the last
//! block. [`ControlSurface`] builds these frames from raw encoder
//! positions and switch levels.
//!
//! # Hardware mapping
//!
//! ```text
//! Encoder:   0         1           2            3
//! Rotation:  mix       input gain  loop gain    random
//! Switch:    record    play        clear        select
//! ```
//!
//! | Switch | Short press     | Long hold        | Release after hold |
//! |--------|-----------------|------------------|--------------------|
//! | record | `RecordToggle`  | `RecordHeld`     | —                  |
//! | play   | `PlayToggle`    | `PlayHeld`       | —                  |
//! | clear  | —               | `Clear`          | `ClearReleased`    |
//! | select | selection `+1`  | selection `-1`   | —                  |
//!
//! Short-press actions fire on release so a long hold never also counts
//! as a tap.

use super::engine::LoopEvent;
use super::error::LooperError;
use super::gesture::{GestureEvent, GestureTracker};
use super::{CONTROL_COUNT, CONTROL_LABELS, LONG_PRESS_MS};

// ── LooperConfig ─────────────────────────────────────────────────────────

/// Tunables for the control surface.
///
/// [`LooperConfig::default()`] matches the device: one second long press,
/// half mix, unity input and loop gain, no randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LooperConfig {
    /// Hold time in milliseconds before a press counts as a long press.
    pub long_press_ms: u32,
    /// Power-on raw values of the four controls (0–127).
    pub initial_values: [i32; CONTROL_COUNT],
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            initial_values: [64, 127, 127, 0],
        }
    }
}

/// Identifies one of the continuous controls.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlId {
    Mix = 0,
    InputGain = 1,
    LoopGain = 2,
    /// Read and displayed, not consumed by the engine.
    Random = 3,
}

impl ControlId {
    pub const ALL: [ControlId; CONTROL_COUNT] = [
        ControlId::Mix,
        ControlId::InputGain,
        ControlId::LoopGain,
        ControlId::Random,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        CONTROL_LABELS[self.index()]
    }
}

/// Round a normalized value to an integer percentage, `round(100 * value)`.
///
/// Values outside `[0, 1]` saturate to `0` or `100`.
pub fn percent(value: f32) -> u8 {
    let scaled = value * 100.0 + 0.5;
    if scaled <= 0.0 {
        0
    } else if scaled >= 100.0 {
        100
    } else {
        scaled as u8
    }
}

// ── Control ──────────────────────────────────────────────────────────────

/// One continuous control with an integer value and a clamped range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control {
    /// Current value, always within `[min_value, max_value]`.
    pub value: i32,
    /// Minimum allowed value (inclusive). Default: 0.
    pub min_value: i32,
    /// Maximum allowed value (inclusive). Default: 127.
    pub max_value: i32,
    /// Set when the value moves; cleared by [`ControlValues::take_changes`].
    pub changed: bool,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            value: 0,
            min_value: 0,
            max_value: 127,
            changed: false,
        }
    }
}

impl Control {
    /// Control with the default range, starting at `value` (clamped).
    pub fn with_value(value: i32) -> Self {
        let mut control = Self::default();
        control.set_value(value);
        control.changed = false;
        control
    }

    /// Set the value, clamped to `[min_value, max_value]`.
    ///
    /// Marks the control changed only if the clamped value differs.
    pub fn set_value(&mut self, v: i32) {
        let clamped = v.clamp(self.min_value, self.max_value);
        if clamped != self.value {
            self.value = clamped;
            self.changed = true;
        }
    }

    /// Value mapped onto `[0, 1]`.
    pub fn normalized(&self) -> f32 {
        let span = self.max_value - self.min_value;
        if span <= 0 {
            return 0.0;
        }
        (self.value - self.min_value) as f32 / span as f32
    }
}

// ── ControlValues ────────────────────────────────────────────────────────

/// Describes a single control change, returned by [`ControlValues::update_from_encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlChange {
    /// Static display label of the control (from [`CONTROL_LABELS`]).
    pub label: &'static str,
    /// Value after the change.
    pub value: i32,
    /// Control index (0-based).
    pub index: usize,
}

/// The four continuous controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlValues {
    pub controls: [Control; CONTROL_COUNT],
}

impl Default for ControlValues {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlValues {
    /// Power-on values from [`LooperConfig::default()`].
    pub fn new() -> Self {
        Self::from_values(LooperConfig::default().initial_values)
    }

    /// Controls with the default range starting at `values` (clamped).
    pub fn from_values(values: [i32; CONTROL_COUNT]) -> Self {
        Self {
            controls: values.map(Control::with_value),
        }
    }

    pub fn get(&self, id: ControlId) -> &Control {
        &self.controls[id.index()]
    }

    /// Apply an encoder delta to control `idx`.
    ///
    /// Out-of-range indices are ignored. Returns the change if the
    /// value actually moved (it may not, at either end of the range).
    pub fn update_from_encoder(&mut self, idx: usize, delta: i32) -> Option<ControlChange> {
        let Some(control) = self.controls.get_mut(idx) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("update_from_encoder: control {} out of bounds", idx);
            return None;
        };

        let before = control.value;
        control.set_value(before.saturating_add(delta));
        if control.value == before {
            return None;
        }
        Some(ControlChange {
            label: CONTROL_LABELS[idx],
            value: control.value,
            index: idx,
        })
    }

    /// Set control `idx` to `value` (clamped).
    ///
    /// Returns [`LooperError::InvalidControlIndex`] if `idx >= CONTROL_COUNT`.
    pub fn set(&mut self, idx: usize, value: i32) -> Result<(), LooperError> {
        let control = self
            .controls
            .get_mut(idx)
            .ok_or(LooperError::InvalidControlIndex)?;
        control.set_value(value);
        Ok(())
    }

    /// All four controls mapped onto `[0, 1]`.
    pub fn normalized(&self) -> [f32; CONTROL_COUNT] {
        core::array::from_fn(|i| self.controls[i].normalized())
    }

    /// Return which controls moved since the last call and clear the flags.
    pub fn take_changes(&mut self) -> [bool; CONTROL_COUNT] {
        self.controls
            .each_mut()
            .map(|control| core::mem::take(&mut control.changed))
    }
}

// ── EventSet ─────────────────────────────────────────────────────────────

/// Set of discrete events collected during one control poll.
///
/// Each event appears at most once per block. Iteration always follows
/// [`LoopEvent::ORDER`], so clears are handled before record and record
/// before play regardless of the order they were inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventSet {
    bits: u8,
}

impl EventSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub fn insert(&mut self, event: LoopEvent) {
        self.bits |= event.bit();
    }

    pub fn contains(&self, event: LoopEvent) -> bool {
        self.bits & event.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Events in processing order.
    pub fn iter(&self) -> impl Iterator<Item = LoopEvent> + '_ {
        LoopEvent::ORDER
            .iter()
            .copied()
            .filter(move |e| self.contains(*e))
    }
}

impl FromIterator<LoopEvent> for EventSet {
    fn from_iter<T: IntoIterator<Item = LoopEvent>>(iter: T) -> Self {
        let mut set = EventSet::empty();
        for event in iter {
            set.insert(event);
        }
        set
    }
}

// ── ControlFrame ─────────────────────────────────────────────────────────

/// Everything the engine reads from the controls for one audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlFrame {
    /// Continuous controls in `[0, 1]`, indexed by [`ControlId`].
    pub values: [f32; CONTROL_COUNT],
    /// Parameter-selection movement (usually -1, 0 or +1).
    pub select_delta: i32,
    /// Discrete events since the previous block.
    pub events: EventSet,
}

impl Default for ControlFrame {
    fn default() -> Self {
        Self {
            values: ControlValues::new().normalized(),
            select_delta: 0,
            events: EventSet::empty(),
        }
    }
}

impl ControlFrame {
    pub fn value(&self, id: ControlId) -> f32 {
        self.values[id.index()]
    }
}

// ── ControlSurface ───────────────────────────────────────────────────────

/// Switch assignments on the encoder board.
const RECORD_SWITCH: usize = 0;
const PLAY_SWITCH: usize = 1;
const CLEAR_SWITCH: usize = 2;
const SELECT_SWITCH: usize = 3;

/// Turns raw encoder-board readings into [`ControlFrame`]s.
///
/// Holds the encoder position baseline, the four control values and one
/// [`GestureTracker`] per switch. The first poll only records the
/// baseline, so whatever the encoders read at power-on is not applied as
/// a jump.
///
/// Record and play toggle when a short press is *released*, not on the
/// press edge. A recording therefore starts, and a first pass starts
/// measuring, one tap length after the press. Hold gestures fire once the
/// hold threshold is reached.
///
/// # Examples
///
/// ```
/// use spirant::looper::{ControlSurface, LoopEvent};
///
/// let mut surface = ControlSurface::new();
/// surface.poll([0; 4], [false; 4], 0);
///
/// // Tap the record switch.
/// surface.poll([0; 4], [true, false, false, false], 10);
/// let frame = surface.poll([0; 4], [false; 4], 60);
/// assert!(frame.events.contains(LoopEvent::RecordToggle));
/// ```
pub struct ControlSurface {
    values: ControlValues,
    previous_positions: Option<[i32; CONTROL_COUNT]>,
    switches: [GestureTracker; CONTROL_COUNT],
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSurface {
    /// Surface with [`LooperConfig::default()`].
    pub fn new() -> Self {
        Self::with_config(&LooperConfig::default())
    }

    pub fn with_config(config: &LooperConfig) -> Self {
        Self {
            values: ControlValues::from_values(config.initial_values),
            previous_positions: None,
            switches: [GestureTracker::new(config.long_press_ms); CONTROL_COUNT],
        }
    }

    pub fn values(&self) -> &ControlValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut ControlValues {
        &mut self.values
    }

    /// Consume one reading of the board and produce the frame for the
    /// next audio block.
    ///
    /// * `positions` — absolute encoder positions.
    /// * `switches` — `true` while a push switch is held down.
    /// * `now_ms` — monotonic millisecond timestamp (may wrap).
    pub fn poll(
        &mut self,
        positions: [i32; CONTROL_COUNT],
        switches: [bool; CONTROL_COUNT],
        now_ms: u32,
    ) -> ControlFrame {
        if let Some(previous) = self.previous_positions {
            for (idx, (&now, &before)) in positions.iter().zip(previous.iter()).enumerate() {
                let delta = now.wrapping_sub(before);
                if delta == 0 {
                    continue;
                }
                if let Some(_change) = self.values.update_from_encoder(idx, delta) {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("control {}: {}", _change.label, _change.value);
                }
            }
        }
        self.previous_positions = Some(positions);

        let mut events = EventSet::empty();
        let mut select_delta = 0;

        let gestures: [Option<GestureEvent>; CONTROL_COUNT] =
            core::array::from_fn(|i| self.switches[i].update(switches[i], now_ms));

        match gestures[RECORD_SWITCH] {
            Some(GestureEvent::ShortRelease) => events.insert(LoopEvent::RecordToggle),
            Some(GestureEvent::LongHold) => events.insert(LoopEvent::RecordHeld),
            _ => {}
        }
        match gestures[PLAY_SWITCH] {
            Some(GestureEvent::ShortRelease) => events.insert(LoopEvent::PlayToggle),
            Some(GestureEvent::LongHold) => events.insert(LoopEvent::PlayHeld),
            _ => {}
        }
        match gestures[CLEAR_SWITCH] {
            Some(GestureEvent::LongHold) => events.insert(LoopEvent::Clear),
            Some(GestureEvent::LongRelease) => events.insert(LoopEvent::ClearReleased),
            _ => {}
        }
        match gestures[SELECT_SWITCH] {
            Some(GestureEvent::ShortRelease) => select_delta = 1,
            Some(GestureEvent::LongHold) => select_delta = -1,
            _ => {}
        }

        ControlFrame {
            values: self.values.normalized(),
            select_delta,
            events,
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASED: [bool; 4] = [false; 4];

    fn held(switch: usize) -> [bool; 4] {
        let mut s = RELEASED;
        s[switch] = true;
        s
    }

    fn primed_surface() -> ControlSurface {
        let mut surface = ControlSurface::with_config(&LooperConfig {
            long_press_ms: 1000,
            ..LooperConfig::default()
        });
        surface.poll([0; 4], RELEASED, 0);
        surface
    }

    // ── percent ──────────────────────────────────────────────────────

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(0.5), 50);
        assert_eq!(percent(0.123), 12);
        assert_eq!(percent(0.126), 13);
        assert_eq!(percent(64.0 / 127.0), 50);
    }

    #[test]
    fn percent_saturates_out_of_range() {
        assert_eq!(percent(-0.5), 0);
        assert_eq!(percent(3.0), 100);
    }

    // ── Control / ControlValues ──────────────────────────────────────

    #[test]
    fn control_clamps_and_normalizes() {
        let mut c = Control::default();
        c.set_value(500);
        assert_eq!(c.value, 127);
        assert_eq!(c.normalized(), 1.0);

        c.set_value(-3);
        assert_eq!(c.value, 0);
        assert_eq!(c.normalized(), 0.0);
    }

    #[test]
    fn degenerate_range_normalizes_to_zero() {
        let c = Control {
            value: 5,
            min_value: 5,
            max_value: 5,
            changed: false,
        };
        assert_eq!(c.normalized(), 0.0);
    }

    #[test]
    fn take_changes_reports_moved_controls_once() {
        let mut values = ControlValues::new();
        assert_eq!(values.take_changes(), [false; 4]);

        values.update_from_encoder(1, -5);
        values.set(3, 0).unwrap(); // already 0, not a change
        assert_eq!(values.take_changes(), [false, true, false, false]);
        assert_eq!(values.take_changes(), [false; 4]);
    }

    #[test]
    fn power_on_values() {
        let values = ControlValues::new();
        assert_eq!(values.get(ControlId::Mix).value, 64);
        assert_eq!(values.get(ControlId::InputGain).normalized(), 1.0);
        assert_eq!(values.get(ControlId::LoopGain).normalized(), 1.0);
        assert_eq!(values.get(ControlId::Random).normalized(), 0.0);
    }

    #[test]
    fn config_sets_initial_values() {
        let surface = ControlSurface::with_config(&LooperConfig {
            initial_values: [0, 200, 10, -4],
            ..LooperConfig::default()
        });
        let values = surface.values();
        assert_eq!(values.get(ControlId::Mix).value, 0);
        assert_eq!(values.get(ControlId::InputGain).value, 127);
        assert_eq!(values.get(ControlId::LoopGain).value, 10);
        assert_eq!(values.get(ControlId::Random).value, 0);
    }

    #[test]
    fn update_from_encoder_reports_change() {
        let mut values = ControlValues::new();
        let change = values.update_from_encoder(0, 10).unwrap();
        assert_eq!(change.label, "mix");
        assert_eq!(change.value, 74);
        assert_eq!(change.index, 0);
    }

    #[test]
    fn update_from_encoder_at_limit_is_not_a_change() {
        let mut values = ControlValues::new();
        assert!(values.update_from_encoder(1, 5).is_none()); // already 127
        assert_eq!(values.get(ControlId::InputGain).value, 127);
    }

    #[test]
    fn update_from_encoder_out_of_bounds_is_noop() {
        let mut values = ControlValues::new();
        let before = values;
        assert!(values.update_from_encoder(4, 1).is_none());
        assert_eq!(values, before);
    }

    #[test]
    fn set_checks_index() {
        let mut values = ControlValues::new();
        assert!(values.set(3, 40).is_ok());
        assert_eq!(values.get(ControlId::Random).value, 40);
        assert_eq!(values.set(4, 1), Err(LooperError::InvalidControlIndex));
    }

    // ── EventSet ─────────────────────────────────────────────────────

    #[test]
    fn event_set_iterates_in_processing_order() {
        let set: EventSet = [LoopEvent::PlayToggle, LoopEvent::RecordToggle, LoopEvent::Clear]
            .into_iter()
            .collect();
        let mut it = set.iter();
        assert_eq!(it.next(), Some(LoopEvent::Clear));
        assert_eq!(it.next(), Some(LoopEvent::RecordToggle));
        assert_eq!(it.next(), Some(LoopEvent::PlayToggle));
        assert_eq!(it.next(), None);
    }

    #[test]
    fn event_set_deduplicates() {
        let mut set = EventSet::empty();
        assert!(set.is_empty());
        set.insert(LoopEvent::PlayHeld);
        set.insert(LoopEvent::PlayHeld);
        assert_eq!(set.iter().count(), 1);
    }

    // ── ControlSurface ───────────────────────────────────────────────

    #[test]
    fn first_poll_only_sets_baseline() {
        let mut surface = ControlSurface::new();
        let frame = surface.poll([50, -20, 7, 3], RELEASED, 0);
        assert_eq!(frame.values, ControlValues::new().normalized());
        assert!(frame.events.is_empty());
    }

    #[test]
    fn rotation_adjusts_matching_control() {
        let mut surface = primed_surface();
        let frame = surface.poll([-64, 0, -27, 10], RELEASED, 5);
        assert_eq!(frame.value(ControlId::Mix), 0.0);
        assert_eq!(surface.values().get(ControlId::LoopGain).value, 100);
        assert_eq!(surface.values().get(ControlId::Random).value, 10);
        assert_eq!(frame.value(ControlId::InputGain), 1.0);
    }

    #[test]
    fn record_tap_toggles_on_release() {
        let mut surface = primed_surface();
        let frame = surface.poll([0; 4], held(RECORD_SWITCH), 10);
        assert!(frame.events.is_empty());
        let frame = surface.poll([0; 4], RELEASED, 100);
        assert!(frame.events.contains(LoopEvent::RecordToggle));
    }

    #[test]
    fn record_start_waits_for_release() {
        let mut surface = primed_surface();
        surface.poll([0; 4], held(RECORD_SWITCH), 10);
        // Still held just under the hold threshold: nothing fires yet.
        let frame = surface.poll([0; 4], held(RECORD_SWITCH), 1000);
        assert!(frame.events.is_empty());
        let frame = surface.poll([0; 4], RELEASED, 1005);
        assert!(frame.events.contains(LoopEvent::RecordToggle));
    }

    #[test]
    fn record_hold_arms_without_toggle() {
        let mut surface = primed_surface();
        surface.poll([0; 4], held(RECORD_SWITCH), 10);
        let frame = surface.poll([0; 4], held(RECORD_SWITCH), 1010);
        assert!(frame.events.contains(LoopEvent::RecordHeld));
        let frame = surface.poll([0; 4], RELEASED, 1100);
        assert!(!frame.events.contains(LoopEvent::RecordToggle));
        assert!(frame.events.is_empty());
    }

    #[test]
    fn play_hold_does_not_also_toggle() {
        let mut surface = primed_surface();
        surface.poll([0; 4], held(PLAY_SWITCH), 0);
        let frame = surface.poll([0; 4], held(PLAY_SWITCH), 1500);
        assert!(frame.events.contains(LoopEvent::PlayHeld));
        let frame = surface.poll([0; 4], held(PLAY_SWITCH), 3000);
        assert!(frame.events.is_empty());
        let frame = surface.poll([0; 4], RELEASED, 3100);
        assert!(!frame.events.contains(LoopEvent::PlayToggle));
    }

    #[test]
    fn clear_needs_a_long_hold() {
        let mut surface = primed_surface();
        surface.poll([0; 4], held(CLEAR_SWITCH), 0);
        let frame = surface.poll([0; 4], RELEASED, 100);
        assert!(frame.events.is_empty());

        surface.poll([0; 4], held(CLEAR_SWITCH), 200);
        let frame = surface.poll([0; 4], held(CLEAR_SWITCH), 1200);
        assert!(frame.events.contains(LoopEvent::Clear));
        let frame = surface.poll([0; 4], held(CLEAR_SWITCH), 2200);
        assert!(frame.events.is_empty());
        let frame = surface.poll([0; 4], RELEASED, 2300);
        assert!(frame.events.contains(LoopEvent::ClearReleased));
    }

    #[test]
    fn select_switch_moves_selection() {
        let mut surface = primed_surface();
        surface.poll([0; 4], held(SELECT_SWITCH), 0);
        let frame = surface.poll([0; 4], RELEASED, 50);
        assert_eq!(frame.select_delta, 1);

        surface.poll([0; 4], held(SELECT_SWITCH), 100);
        let frame = surface.poll([0; 4], held(SELECT_SWITCH), 1100);
        assert_eq!(frame.select_delta, -1);
        let frame = surface.poll([0; 4], RELEASED, 1200);
        assert_eq!(frame.select_delta, 0);
    }
}
