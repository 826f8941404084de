//! Output mixing stage.
//!
//! A pure function of the raw loop sample, the live input and the
//! current gains. Gains arrive already clamped to `[0, 1]` from the
//! control surface; nothing here clamps or divides by them.

/// Gains applied by [`mix`], refreshed once per audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MixParams {
    /// Crossfade weight: 1 is loop only, 0 is live input only.
    pub mix_level: f32,
    /// Trim on the live input.
    pub input_gain: f32,
    /// Trim on the loop signal.
    pub loop_gain: f32,
}

impl Default for MixParams {
    fn default() -> Self {
        Self {
            mix_level: 0.5,
            input_gain: 1.0,
            loop_gain: 1.0,
        }
    }
}

/// Blend one loop sample against one input sample.
///
/// While recording, the input is not passed through; it is only heard via
/// what was just written into the loop, so the output is
/// `loop_sample * mix_level`. Otherwise the two signals are crossfaded
/// linearly, each with its own gain trim.
///
/// # Examples
///
/// ```
/// use spirant::looper::mix::{mix, MixParams};
///
/// let params = MixParams { mix_level: 0.5, input_gain: 1.0, loop_gain: 1.0 };
/// let out = mix(0.4, 0.2, &params, false);
/// assert!((out - 0.3).abs() < 1e-6);
/// ```
#[inline]
pub fn mix(loop_sample: f32, input_sample: f32, params: &MixParams, recording: bool) -> f32 {
    if recording {
        loop_sample * params.mix_level
    } else {
        loop_sample * params.loop_gain * params.mix_level
            + input_sample * params.input_gain * (1.0 - params.mix_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn crossfade_is_linear_blend() {
        let params = MixParams {
            mix_level: 0.5,
            input_gain: 1.0,
            loop_gain: 1.0,
        };
        assert!(close(mix(0.4, 0.2, &params, false), 0.3));
    }

    #[test]
    fn recording_ignores_live_input() {
        let params = MixParams {
            mix_level: 0.5,
            input_gain: 1.0,
            loop_gain: 1.0,
        };
        assert!(close(mix(0.4, 0.9, &params, true), 0.2));
        assert!(close(mix(0.4, -0.9, &params, true), 0.2));
    }

    #[test]
    fn extremes_select_one_side() {
        let loop_only = MixParams {
            mix_level: 1.0,
            input_gain: 1.0,
            loop_gain: 0.5,
        };
        assert!(close(mix(0.8, 0.3, &loop_only, false), 0.4));

        let input_only = MixParams {
            mix_level: 0.0,
            input_gain: 0.5,
            loop_gain: 1.0,
        };
        assert!(close(mix(0.8, 0.3, &input_only, false), 0.15));
    }

    #[test]
    fn recording_does_not_apply_loop_gain() {
        let params = MixParams {
            mix_level: 1.0,
            input_gain: 1.0,
            loop_gain: 0.25,
        };
        assert!(close(mix(0.8, 0.0, &params, true), 0.8));
    }
}
