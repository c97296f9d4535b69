//! Keyframe phase mapping and track sampling
//!
//! Maps an elapsed time onto a bracketing keyframe pair plus an
//! interpolation factor, and samples the three curve types. Rotation uses
//! shorter-arc slerp; translation and scale use plain per-component lerp.

use glam::{Quat, Vec3};

use crate::clip::Keyframe;

/// Position of an elapsed time within a clip's keyframe grid
///
/// `next` wraps to sample 0 past the last keyframe so looping clips
/// interpolate seamlessly across the restart. One-shot clips get the same
/// wrap; stopping at completion is the playback controller's policy, not
/// the evaluator's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframePhase {
    /// Index of the keyframe at or before the elapsed time
    pub current: usize,
    /// Index of the following keyframe, wrapped modulo the sample count
    pub next: usize,
    /// Fractional progress from `current` to `next`, in `[0, 1)`
    pub interp: f32,
}

impl KeyframePhase {
    /// Compute the phase for an elapsed time
    ///
    /// `cursor = (elapsed mod duration) / duration * sample_count`;
    /// `current` is its floor and `interp` its fractional part. `duration`
    /// must be positive and `sample_count >= 2`, which [`crate::clip::Clip`]
    /// guarantees for any clip that survived load-time validation.
    pub fn at(elapsed: f64, duration: f32, sample_count: usize) -> Self {
        let duration = f64::from(duration);
        let cursor = elapsed.rem_euclid(duration) / duration * sample_count as f64;

        // Float rounding can land the cursor exactly on sample_count.
        let current = (cursor as usize).min(sample_count - 1);
        let interp = (cursor - current as f64) as f32;

        Self {
            current,
            next: (current + 1) % sample_count,
            interp: interp.clamp(0.0, 1.0),
        }
    }

    /// Whether this phase sits on the final keyframe of the clip
    pub fn at_last_keyframe(&self, sample_count: usize) -> bool {
        self.current + 1 >= sample_count
    }
}

/// Sample a rotation curve at the given phase, shorter-arc slerp
///
/// At `interp == 0` the `current` sample is returned untouched, so
/// evaluating exactly on a keyframe reproduces the authored value with no
/// interpolation error.
pub fn sample_rotation(curve: &[Keyframe<Quat>], phase: KeyframePhase) -> Quat {
    let t = phase.interp;
    if t == 0.0 {
        return curve[phase.current].value;
    }
    curve[phase.current].value.slerp(curve[phase.next].value, t)
}

/// Sample a translation or scale curve at the given phase, per-component lerp
pub fn sample_vector(curve: &[Keyframe<Vec3>], phase: KeyframePhase) -> Vec3 {
    let t = phase.interp;
    if t == 0.0 {
        return curve[phase.current].value;
    }
    curve[phase.current].value.lerp(curve[phase.next].value, t)
}
