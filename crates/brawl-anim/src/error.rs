use thiserror::Error;

/// Error types for skeleton and clip construction
///
/// All variants are load-time failures: once a `Skeleton`, `Clip` or
/// `BoundClip` has been built successfully, the per-tick evaluation path
/// cannot fail.
#[derive(Error, Debug)]
pub enum AnimError {
    /// A bone references a parent that does not precede it in storage order
    #[error("bone {bone} references parent {parent}; parents must be stored before children")]
    BoneOrder { bone: usize, parent: usize },

    /// Two bones share the same name
    #[error("duplicate bone name: '{0}'")]
    DuplicateBone(String),

    /// A clip has fewer than two keyframe samples
    #[error("clip '{clip}' has {count} samples; at least 2 are required")]
    BadSampleCount { clip: String, count: usize },

    /// A clip has a non-positive duration
    #[error("clip '{clip}' has non-positive duration {duration}")]
    BadDuration { clip: String, duration: f32 },

    /// A curve's sample count does not match the clip's sample count
    #[error(
        "clip '{clip}', bone '{bone}': {curve} curve has {actual} samples, expected {expected}"
    )]
    CurveLengthMismatch {
        clip: String,
        bone: String,
        curve: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Keyframe times in a curve are not monotonically non-decreasing
    #[error("clip '{clip}', bone '{bone}': {curve} keyframe times are not sorted")]
    UnsortedKeyframes {
        clip: String,
        bone: String,
        curve: &'static str,
    },

    /// A clip track references a bone the skeleton does not have
    #[error("clip '{clip}' animates unknown bone '{bone}'")]
    UnknownTrackBone { clip: String, bone: String },
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
