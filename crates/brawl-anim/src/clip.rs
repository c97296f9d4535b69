//! Keyframed animation clips
//!
//! A [`Clip`] is immutable asset data: per-bone rotation/translation/scale
//! curves sampled at a fixed number of keyframes, shared between instances
//! via `Arc`. A [`BoundClip`] is a clip resolved against one skeleton so the
//! evaluator can find each bone's track by array index instead of hashing
//! bone names every frame.

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::error::{AnimError, Result};
use crate::skeleton::Skeleton;

/// A single keyframe sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    /// Sample time in seconds from clip start
    pub time: f32,
    /// Sampled value
    pub value: T,
}

impl<T> Keyframe<T> {
    /// Create a keyframe
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Animation curves for one bone
///
/// The three curves are sampled independently but share the clip's sample
/// count; this is validated in [`Clip::new`].
#[derive(Debug, Clone)]
pub struct BoneTrack {
    /// Rotation samples (interpolated with shorter-arc slerp)
    pub rotation: Vec<Keyframe<Quat>>,
    /// Translation samples (interpolated per component)
    pub translation: Vec<Keyframe<Vec3>>,
    /// Scale samples (interpolated per component, not normalized)
    pub scale: Vec<Keyframe<Vec3>>,
}

/// Playback category of a clip
///
/// Looping clips (idle, run) restart seamlessly and may be interrupted at
/// any time; one-shot clips (attacks, recoveries) play to completion before
/// the playback controller honors another request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClipMode {
    /// Restarts from sample 0 when the duration elapses
    Loop,
    /// Plays once; completion is reported to the playback controller
    OneShot,
}

/// A named, timed animation: per-bone keyframe tracks plus duration
///
/// Immutable after construction. Wrap in an [`Arc`] to share between any
/// number of playback instances; concurrent read-only access is safe.
#[derive(Debug)]
pub struct Clip {
    name: String,
    mode: ClipMode,
    sample_count: usize,
    duration: f32,
    tracks: Vec<BoneTrack>,
    track_by_bone: HashMap<String, usize>,
}

impl Clip {
    /// Build a clip from loader output, validating the track data
    ///
    /// Rejects clips with fewer than two samples or a non-positive duration
    /// (the playback phase math divides by both), curves whose length does
    /// not match `sample_count`, and unsorted keyframe times. Bones absent
    /// from `tracks` are animated with the identity local transform.
    pub fn new(
        name: impl Into<String>,
        mode: ClipMode,
        sample_count: usize,
        duration: f32,
        tracks: HashMap<String, BoneTrack>,
    ) -> Result<Self> {
        let name = name.into();

        if sample_count < 2 {
            return Err(AnimError::BadSampleCount {
                clip: name,
                count: sample_count,
            });
        }
        if duration <= 0.0 {
            return Err(AnimError::BadDuration {
                clip: name,
                duration,
            });
        }

        let mut flat = Vec::with_capacity(tracks.len());
        let mut track_by_bone = HashMap::with_capacity(tracks.len());
        for (bone, track) in tracks {
            validate_curve(&name, &bone, "rotation", sample_count, &track.rotation)?;
            validate_curve(&name, &bone, "translation", sample_count, &track.translation)?;
            validate_curve(&name, &bone, "scale", sample_count, &track.scale)?;

            track_by_bone.insert(bone, flat.len());
            flat.push(track);
        }

        Ok(Self {
            name,
            mode,
            sample_count,
            duration,
            tracks: flat,
            track_by_bone,
        })
    }

    /// Clip name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playback category
    pub fn mode(&self) -> ClipMode {
        self.mode
    }

    /// Number of keyframe samples
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Playback duration in seconds at 1x speed
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Track for the named bone, if the clip animates it
    pub fn track_for_bone(&self, bone: &str) -> Option<&BoneTrack> {
        self.track_by_bone.get(bone).map(|&i| &self.tracks[i])
    }

    /// Names of the bones this clip animates
    pub fn animated_bones(&self) -> impl Iterator<Item = &str> {
        self.track_by_bone.keys().map(String::as_str)
    }
}

fn validate_curve<T>(
    clip: &str,
    bone: &str,
    curve: &'static str,
    expected: usize,
    samples: &[Keyframe<T>],
) -> Result<()> {
    if samples.len() != expected {
        return Err(AnimError::CurveLengthMismatch {
            clip: clip.to_string(),
            bone: bone.to_string(),
            curve,
            expected,
            actual: samples.len(),
        });
    }
    if samples.windows(2).any(|w| w[1].time < w[0].time) {
        return Err(AnimError::UnsortedKeyframes {
            clip: clip.to_string(),
            bone: bone.to_string(),
            curve,
        });
    }
    Ok(())
}

/// A clip bound to a specific skeleton
///
/// Binding happens once per (clip, skeleton) pair and turns the per-frame
/// bone-name lookup into an array index: `track_of[bone_index]` is the
/// clip-internal track index, or `None` for bones the clip leaves static.
#[derive(Debug)]
pub struct BoundClip {
    clip: Arc<Clip>,
    track_of: Box<[Option<usize>]>,
}

impl BoundClip {
    /// Resolve a clip's bone-name-keyed tracks against a skeleton
    ///
    /// Errors if the clip animates a bone the skeleton does not have; that
    /// is malformed asset data and is rejected here, at load time, rather
    /// than silently dropped.
    pub fn bind(clip: Arc<Clip>, skeleton: &Skeleton) -> Result<Self> {
        for bone in clip.animated_bones() {
            if skeleton.bone_index(bone).is_none() {
                return Err(AnimError::UnknownTrackBone {
                    clip: clip.name().to_string(),
                    bone: bone.to_string(),
                });
            }
        }

        let mut track_of = vec![None; skeleton.len()].into_boxed_slice();
        for (bone, &track) in &clip.track_by_bone {
            if let Some(index) = skeleton.bone_index(bone) {
                track_of[index] = Some(track);
            }
        }

        let untracked = track_of.iter().filter(|t| t.is_none()).count();
        if untracked > 0 {
            log::debug!(
                "clip '{}': {untracked}/{} bones have no track and stay at identity",
                clip.name(),
                skeleton.len()
            );
        }

        Ok(Self { clip, track_of })
    }

    /// The underlying shared clip
    pub fn clip(&self) -> &Arc<Clip> {
        &self.clip
    }

    /// Clip name (shorthand for `self.clip().name()`)
    pub fn name(&self) -> &str {
        self.clip.name()
    }

    /// Playback category of the underlying clip
    pub fn mode(&self) -> ClipMode {
        self.clip.mode()
    }

    /// Track for the given bone index, `None` when the bone is untracked
    pub fn track(&self, bone: usize) -> Option<&BoneTrack> {
        self.track_of
            .get(bone)
            .copied()
            .flatten()
            .map(|i| &self.clip.tracks[i])
    }
}
