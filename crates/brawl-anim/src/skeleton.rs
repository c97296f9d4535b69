//! Bone hierarchy and bind pose
//!
//! A [`Skeleton`] is the static side of skeletal animation: an ordered list
//! of bones, parents stored before children, with the inverse-bind matrices
//! computed once at construction. All per-frame scratch state lives in
//! [`crate::pose::PoseBuffer`], so one skeleton can be shared read-only
//! between any number of animated instances.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

use crate::error::{AnimError, Result};

/// Loader-facing description of a single bone
///
/// Produced by the asset layer (e.g. a glTF skin import). The list handed to
/// [`Skeleton::new`] must be ordered parents-before-children.
#[derive(Debug, Clone)]
pub struct BoneSpec {
    /// Unique bone name, used to match animation tracks
    pub name: String,
    /// Index of the parent bone, `None` for roots
    pub parent: Option<usize>,
    /// Rest-pose local rotation
    pub bind_rotation: Quat,
    /// Rest-pose local translation
    pub bind_translation: Vec3,
}

/// A single bone of a skeleton, immutable after construction
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    parent: Option<usize>,
    bind_rotation: Quat,
    bind_translation: Vec3,
}

impl Bone {
    /// Bone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent bone index, `None` for roots
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Rest-pose local rotation
    pub fn bind_rotation(&self) -> Quat {
        self.bind_rotation
    }

    /// Rest-pose local translation
    pub fn bind_translation(&self) -> Vec3 {
        self.bind_translation
    }
}

/// Static bone hierarchy with precomputed inverse-bind matrices
///
/// Storage order is hierarchical order: for every bone with a parent,
/// `parent < index`. The pose evaluator relies on this to resolve parents
/// before children in a single forward pass.
#[derive(Debug)]
pub struct Skeleton {
    bones: Box<[Bone]>,
    inverse_bind: Box<[Mat4]>,
    by_name: HashMap<String, usize>,
}

impl Skeleton {
    /// Build a skeleton and compute its bind pose
    ///
    /// Validates the parents-before-children ordering and bone name
    /// uniqueness, then runs the single bind-pose pass: for each bone,
    /// `local = rotation * translation` (bind scale is identity),
    /// `world = parent.world * local`, and the stored inverse-bind matrix is
    /// `world.inverse()`.
    ///
    /// A degenerate bind pose producing a singular world matrix is not
    /// detected; the inverse is whatever `glam` returns for it.
    pub fn new(specs: Vec<BoneSpec>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if let Some(parent) = spec.parent {
                if parent >= index {
                    return Err(AnimError::BoneOrder {
                        bone: index,
                        parent,
                    });
                }
            }
            if by_name.insert(spec.name.clone(), index).is_some() {
                return Err(AnimError::DuplicateBone(spec.name.clone()));
            }
        }

        // Bind pose pass. Parents are resolved before children because of
        // the ordering validated above.
        let mut world = Vec::with_capacity(specs.len());
        let mut inverse_bind = Vec::with_capacity(specs.len());
        for spec in &specs {
            let local = Mat4::from_rotation_translation(spec.bind_rotation, spec.bind_translation);
            let bone_world = match spec.parent {
                Some(parent) => world[parent] * local,
                None => local,
            };
            inverse_bind.push(bone_world.inverse());
            world.push(bone_world);
        }

        let bones = specs
            .into_iter()
            .map(|spec| Bone {
                name: spec.name,
                parent: spec.parent,
                bind_rotation: spec.bind_rotation,
                bind_translation: spec.bind_translation,
            })
            .collect();

        Ok(Self {
            bones,
            inverse_bind: inverse_bind.into_boxed_slice(),
            by_name,
        })
    }

    /// Number of bones
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Whether the skeleton has no bones
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// All bones in hierarchical order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Bone at the given index
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Look up a bone index by name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Inverse-bind matrices, one per bone in hierarchical order
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind
    }
}
