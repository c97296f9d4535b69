//! Per-instance playback control
//!
//! Tracks which clip an instance is playing and since when, decides whether
//! a requested clip switch is honored, and derives the keyframe phase plus
//! the completion flag each tick. One `Playback` per animated instance; the
//! clips themselves are shared.

use std::sync::Arc;

use crate::clip::{BoundClip, ClipMode};
use crate::interpolation::KeyframePhase;

/// Per-deployment playback tunables
///
/// `speed_scale` multiplies every clip's duration before the phase mapping;
/// values above 1.0 slow playback down. Different content drops have shipped
/// with different factors, so this is configuration, not a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackOptions {
    /// Duration multiplier applied to every clip (1.0 = authored speed)
    pub speed_scale: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self { speed_scale: 1.0 }
    }
}

/// One evaluated tick of playback
///
/// Everything the pose evaluator and the combat layer need for this frame:
/// the clip, the phase to sample it at, and whether the clip reached its
/// final keyframe on this tick for the first time.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The clip being played
    pub clip: Arc<BoundClip>,
    /// Seconds since the clip started (before speed scaling)
    pub elapsed: f64,
    /// Keyframe phase, computed against the speed-scaled duration
    pub phase: KeyframePhase,
    /// True exactly once, on the tick the clip first completes
    pub just_completed: bool,
}

#[derive(Debug)]
struct ActiveClip {
    clip: Arc<BoundClip>,
    started_at: f64,
    completed: bool,
}

/// Playback state machine for one animated instance
///
/// The transition rule, applied on every [`Self::request`]:
/// switch to the requested clip when nothing is playing, when the active
/// clip has completed, or when the active clip is a loop (movement and idle
/// loops are always interruptible). Otherwise the request is dropped — a
/// one-shot attack cannot be interrupted mid-swing.
#[derive(Debug, Default)]
pub struct Playback {
    active: Option<ActiveClip>,
    options: PlaybackOptions,
}

impl Playback {
    /// Create a controller with the given tunables
    pub fn new(options: PlaybackOptions) -> Self {
        Self {
            active: None,
            options,
        }
    }

    /// Playback tunables
    pub fn options(&self) -> PlaybackOptions {
        self.options
    }

    /// Request a clip switch; returns whether the switch happened
    ///
    /// On a switch the start time is reset: to `now` for one-shot clips, and
    /// to epoch 0 for looping clips so their phase depends only on the
    /// global clock, not on when the instance started running or walking.
    pub fn request(&mut self, clip: &Arc<BoundClip>, now: f64) -> bool {
        let interruptible = match &self.active {
            None => true,
            Some(active) => active.completed || active.clip.mode() == ClipMode::Loop,
        };
        if !interruptible {
            return false;
        }

        if let Some(active) = &self.active {
            if Arc::ptr_eq(&active.clip, clip) && clip.mode() == ClipMode::Loop {
                // Re-requesting the running loop every tick is the normal
                // idle/run pattern; nothing to reset.
                return false;
            }
            log::debug!("clip switch: '{}' -> '{}'", active.clip.name(), clip.name());
        } else {
            log::debug!("clip start: '{}'", clip.name());
        }

        let started_at = match clip.mode() {
            ClipMode::OneShot => now,
            ClipMode::Loop => 0.0,
        };
        self.active = Some(ActiveClip {
            clip: Arc::clone(clip),
            started_at,
            completed: false,
        });
        true
    }

    /// Advance to `now` and produce this tick's frame
    ///
    /// Re-derives the completion flag from elapsed time: once the phase
    /// reaches the final keyframe the clip is completed, and stays so until
    /// the next switch. Returns `None` while no clip is active.
    pub fn advance(&mut self, now: f64) -> Option<Frame> {
        let options = self.options;
        let active = self.active.as_mut()?;

        let clip = active.clip.clip();
        let scaled_duration = clip.duration() * options.speed_scale;
        let elapsed = now - active.started_at;
        let phase = KeyframePhase::at(elapsed, scaled_duration, clip.sample_count());

        let was_completed = active.completed;
        if phase.at_last_keyframe(clip.sample_count()) {
            active.completed = true;
        }

        Some(Frame {
            clip: Arc::clone(&active.clip),
            elapsed,
            phase,
            just_completed: active.completed && !was_completed,
        })
    }

    /// Currently active clip, if any
    pub fn active_clip(&self) -> Option<&Arc<BoundClip>> {
        self.active.as_ref().map(|a| &a.clip)
    }

    /// Name of the currently active clip
    pub fn active_clip_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.clip.name())
    }

    /// Whether the active clip has played through at least once
    pub fn is_completed(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.completed)
    }

    /// Seconds since the active clip started, as of `now`
    pub fn elapsed(&self, now: f64) -> Option<f64> {
        self.active.as_ref().map(|a| now - a.started_at)
    }

    /// Drop the active clip
    pub fn stop(&mut self) {
        self.active = None;
    }
}
