//! Pose evaluation: keyframe tracks to skinning matrices
//!
//! Each animated instance owns one [`PoseBuffer`], preallocated from the
//! skeleton's bone count. Evaluation mutates only that buffer, so a single
//! `Skeleton` and its `BoundClip`s can be shared read-only between a player
//! and any number of network puppets.

use glam::Mat4;

use crate::clip::BoundClip;
use crate::interpolation::{KeyframePhase, sample_rotation, sample_vector};
use crate::skeleton::Skeleton;

/// Per-instance evaluation scratch and output
///
/// Holds the world matrices (working state of the hierarchy pass) and the
/// skinning matrices (`world * inverse_bind`, the output the renderer
/// consumes). Both are arena-style arrays sized once, at construction.
#[derive(Debug)]
pub struct PoseBuffer {
    world: Box<[Mat4]>,
    skinning: Box<[Mat4]>,
}

impl PoseBuffer {
    /// Allocate a buffer for the given skeleton
    pub fn for_skeleton(skeleton: &Skeleton) -> Self {
        Self {
            world: vec![Mat4::IDENTITY; skeleton.len()].into_boxed_slice(),
            skinning: vec![Mat4::IDENTITY; skeleton.len()].into_boxed_slice(),
        }
    }

    /// Number of bones this buffer was sized for
    pub fn bone_count(&self) -> usize {
        self.world.len()
    }

    /// Evaluate a clip at the given elapsed time (seconds)
    ///
    /// Uses the clip's unscaled duration for the phase mapping. Playback
    /// speed scaling is applied by the playback controller, which hands the
    /// pre-computed phase to [`Self::evaluate_phase`] instead.
    pub fn evaluate(&mut self, skeleton: &Skeleton, clip: &BoundClip, elapsed: f64) {
        let phase = KeyframePhase::at(elapsed, clip.clip().duration(), clip.clip().sample_count());
        self.evaluate_phase(skeleton, clip, phase);
    }

    /// Evaluate a clip at a pre-computed keyframe phase
    ///
    /// Single forward pass in bone storage order. Storage order is
    /// hierarchical order, so every parent's world matrix is final before
    /// any of its children read it.
    pub fn evaluate_phase(&mut self, skeleton: &Skeleton, clip: &BoundClip, phase: KeyframePhase) {
        debug_assert_eq!(self.world.len(), skeleton.len(), "buffer/skeleton mismatch");

        let inverse_bind = skeleton.inverse_bind_matrices();
        for (index, bone) in skeleton.bones().iter().enumerate() {
            let local = match clip.track(index) {
                // Untracked bones hold the identity local transform.
                None => Mat4::IDENTITY,
                Some(track) => {
                    let rotation = sample_rotation(&track.rotation, phase);
                    let translation = sample_vector(&track.translation, phase);
                    let scale = sample_vector(&track.scale, phase);
                    Mat4::from_scale_rotation_translation(scale, rotation, translation)
                }
            };

            let world = match bone.parent() {
                Some(parent) => self.world[parent] * local,
                None => local,
            };
            self.world[index] = world;
            // Offset maps rest-pose vertices into posed space; the order of
            // this product is load-bearing.
            self.skinning[index] = world * inverse_bind[index];
        }
    }

    /// Posed world matrices, bone order
    pub fn world_matrices(&self) -> &[Mat4] {
        &self.world
    }

    /// Skinning offset matrices, bone order
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning
    }

    /// Append the skinning matrices as 16 column-major floats per bone
    ///
    /// This is the flat layout the skinning shader consumes (same
    /// convention as the glam matrices themselves).
    pub fn write_skinning(&self, out: &mut Vec<f32>) {
        out.reserve(self.skinning.len() * 16);
        for matrix in &self.skinning {
            out.extend_from_slice(&matrix.to_cols_array());
        }
    }

    /// Skinning matrices flattened into a fresh `Vec<f32>`
    pub fn skinning_floats(&self) -> Vec<f32> {
        let mut out = Vec::new();
        self.write_skinning(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use glam::{Quat, Vec3};

    use super::*;
    use crate::clip::{BoneTrack, Clip, ClipMode, Keyframe};
    use crate::skeleton::BoneSpec;

    fn chain_skeleton() -> Skeleton {
        let specs = vec![
            BoneSpec {
                name: "root".to_string(),
                parent: None,
                bind_rotation: Quat::IDENTITY,
                bind_translation: Vec3::ZERO,
            },
            BoneSpec {
                name: "mid".to_string(),
                parent: Some(0),
                bind_rotation: Quat::IDENTITY,
                bind_translation: Vec3::new(0.0, 1.0, 0.0),
            },
            BoneSpec {
                name: "tip".to_string(),
                parent: Some(1),
                bind_rotation: Quat::IDENTITY,
                bind_translation: Vec3::new(0.0, 1.0, 0.0),
            },
        ];
        Skeleton::new(specs).expect("valid skeleton")
    }

    fn static_track(samples: usize, rotation: Quat, translation: Vec3) -> BoneTrack {
        let step = 1.0 / (samples - 1) as f32;
        BoneTrack {
            rotation: (0..samples)
                .map(|i| Keyframe::new(i as f32 * step, rotation))
                .collect(),
            translation: (0..samples)
                .map(|i| Keyframe::new(i as f32 * step, translation))
                .collect(),
            scale: (0..samples)
                .map(|i| Keyframe::new(i as f32 * step, Vec3::ONE))
                .collect(),
        }
    }

    #[test]
    fn test_untracked_bones_stay_at_bind_offset() {
        let skeleton = chain_skeleton();
        let clip =
            Arc::new(Clip::new("empty", ClipMode::Loop, 2, 1.0, HashMap::new()).expect("clip"));
        let bound = BoundClip::bind(clip, &skeleton).expect("bind");

        let mut pose = PoseBuffer::for_skeleton(&skeleton);
        pose.evaluate(&skeleton, &bound, 0.0);

        // All locals are identity, so the world pass collapses the bind
        // translations and the offsets are inverse-bind alone.
        let expected = skeleton.inverse_bind_matrices()[2];
        let actual = pose.skinning_matrices()[2];
        assert!(actual.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_translation_propagates_to_children() {
        let skeleton = chain_skeleton();

        let mut tracks = HashMap::new();
        tracks.insert(
            "root".to_string(),
            static_track(2, Quat::IDENTITY, Vec3::new(3.0, 0.0, 0.0)),
        );
        tracks.insert(
            "mid".to_string(),
            static_track(2, Quat::IDENTITY, Vec3::new(0.0, 1.0, 0.0)),
        );
        tracks.insert(
            "tip".to_string(),
            static_track(2, Quat::IDENTITY, Vec3::new(0.0, 1.0, 0.0)),
        );
        let clip = Arc::new(Clip::new("slide", ClipMode::Loop, 2, 1.0, tracks).expect("clip"));
        let bound = BoundClip::bind(clip, &skeleton).expect("bind");

        let mut pose = PoseBuffer::for_skeleton(&skeleton);
        pose.evaluate(&skeleton, &bound, 0.0);

        // The clip reproduces the bind pose except the root slides +3 on X,
        // so every bone's offset is a pure +3 X translation.
        let tip_offset = pose.skinning_matrices()[2];
        let moved = tip_offset.transform_point3(Vec3::new(0.0, 2.0, 0.0));
        assert!((moved - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_flat_output_layout() {
        let skeleton = chain_skeleton();
        let clip =
            Arc::new(Clip::new("empty", ClipMode::Loop, 2, 1.0, HashMap::new()).expect("clip"));
        let bound = BoundClip::bind(clip, &skeleton).expect("bind");

        let mut pose = PoseBuffer::for_skeleton(&skeleton);
        pose.evaluate(&skeleton, &bound, 0.0);

        let flat = pose.skinning_floats();
        assert_eq!(flat.len(), 16 * skeleton.len());
        let expected = pose.skinning_matrices()[1].to_cols_array();
        assert_eq!(&flat[16..32], &expected);
    }

    #[test]
    fn test_buffer_reuse_between_ticks() {
        let skeleton = chain_skeleton();

        let mut tracks = HashMap::new();
        let mut track = static_track(2, Quat::IDENTITY, Vec3::ZERO);
        track.translation[1].value = Vec3::new(2.0, 0.0, 0.0);
        tracks.insert("root".to_string(), track);
        let clip = Arc::new(Clip::new("drift", ClipMode::Loop, 2, 1.0, tracks).expect("clip"));
        let bound = BoundClip::bind(clip, &skeleton).expect("bind");

        let mut pose = PoseBuffer::for_skeleton(&skeleton);
        pose.evaluate(&skeleton, &bound, 0.0);
        let at_start = pose.skinning_matrices()[0];
        pose.evaluate(&skeleton, &bound, 0.25);
        let later = pose.skinning_matrices()[0];
        assert!(!at_start.abs_diff_eq(later, 1e-6), "pose must change over time");
    }
}
