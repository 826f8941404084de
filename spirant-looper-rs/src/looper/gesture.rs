/// Where a single push control is within one press gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GestureState {
    /// Released and waiting for the next press.
    #[default]
    Idle,
    /// Held down since `since_ms`, long-press threshold not reached yet.
    Pressed { since_ms: u32 },
    /// Held past the long-press threshold. Stays here until release.
    LongHeld,
}

/// Edge produced by [`GestureTracker::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GestureEvent {
    /// The control went down.
    Pressed,
    /// Released before the long-press threshold.
    ShortRelease,
    /// The long-press threshold was just crossed. Fires once per press.
    LongHold,
    /// Released after a long hold. Never followed by a short release.
    LongRelease,
}

/// Per-control gesture state machine: `Idle → Pressed → LongHeld → Idle`.
///
/// Turns a sampled switch level into at most one edge per poll. A long
/// hold fires [`GestureEvent::LongHold`] exactly once and then suppresses
/// the short-release that would otherwise follow, so a hold never doubles
/// as a tap.
///
/// # Examples
///
/// ```
/// use spirant::looper::{GestureEvent, GestureTracker};
///
/// let mut button = GestureTracker::new(1000);
/// assert_eq!(button.update(true, 0), Some(GestureEvent::Pressed));
/// assert_eq!(button.update(true, 1000), Some(GestureEvent::LongHold));
/// assert_eq!(button.update(true, 1500), None);
/// assert_eq!(button.update(false, 1600), Some(GestureEvent::LongRelease));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GestureTracker {
    state: GestureState,
    long_press_ms: u32,
}

impl GestureTracker {
    pub fn new(long_press_ms: u32) -> Self {
        Self {
            state: GestureState::Idle,
            long_press_ms,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Feed the current switch level and a millisecond timestamp.
    ///
    /// Timestamps may wrap; elapsed time is computed with wrapping
    /// subtraction.
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> Option<GestureEvent> {
        let (next, event) = match (self.state, pressed) {
            (GestureState::Idle, true) => (
                GestureState::Pressed { since_ms: now_ms },
                Some(GestureEvent::Pressed),
            ),
            (GestureState::Idle, false) => (GestureState::Idle, None),
            (GestureState::Pressed { since_ms }, true) => {
                if now_ms.wrapping_sub(since_ms) >= self.long_press_ms {
                    (GestureState::LongHeld, Some(GestureEvent::LongHold))
                } else {
                    (self.state, None)
                }
            }
            (GestureState::Pressed { .. }, false) => {
                (GestureState::Idle, Some(GestureEvent::ShortRelease))
            }
            (GestureState::LongHeld, true) => (GestureState::LongHeld, None),
            (GestureState::LongHeld, false) => {
                (GestureState::Idle, Some(GestureEvent::LongRelease))
            }
        };
        self.state = next;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_produces_press_then_short_release() {
        let mut g = GestureTracker::new(1000);
        assert_eq!(g.update(true, 10), Some(GestureEvent::Pressed));
        assert_eq!(g.update(true, 200), None);
        assert_eq!(g.update(false, 300), Some(GestureEvent::ShortRelease));
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn long_hold_fires_once_and_suppresses_short_release() {
        let mut g = GestureTracker::new(1000);
        g.update(true, 0);
        assert_eq!(g.update(true, 999), None);
        assert_eq!(g.update(true, 1000), Some(GestureEvent::LongHold));
        for t in 1001..1010 {
            assert_eq!(g.update(true, t), None);
        }
        assert_eq!(g.update(false, 1200), Some(GestureEvent::LongRelease));
        assert_eq!(g.update(false, 1300), None);
    }

    #[test]
    fn rearms_after_release() {
        let mut g = GestureTracker::new(100);
        g.update(true, 0);
        g.update(true, 150);
        g.update(false, 160);

        assert_eq!(g.update(true, 200), Some(GestureEvent::Pressed));
        assert_eq!(g.update(true, 300), Some(GestureEvent::LongHold));
    }

    #[test]
    fn elapsed_time_survives_timer_wrap() {
        let mut g = GestureTracker::new(1000);
        g.update(true, u32::MAX - 100);
        assert_eq!(g.update(true, 500), None);
        assert_eq!(g.update(true, 899), Some(GestureEvent::LongHold));
    }
}
