//! Skeletal animation core for the brawler runtime
//!
//! Evaluates keyframed clips against a bone hierarchy and produces the flat
//! skinning-matrix array a renderer uploads per frame. Asset data
//! ([`Skeleton`], [`Clip`]) is immutable and shared; per-instance state
//! ([`Playback`], [`PoseBuffer`]) is small and owned by each fighter or
//! network puppet.
//!
//! The per-tick path (`Playback::advance` + `PoseBuffer::evaluate_phase`)
//! is infallible and allocation-free; all validation happens when assets
//! are loaded and bound.

pub mod clip;
pub mod error;
pub mod interpolation;
pub mod playback;
pub mod pose;
pub mod skeleton;

// Re-export common types
pub use clip::{BoneTrack, BoundClip, Clip, ClipMode, Keyframe};
pub use error::{AnimError, Result};
pub use interpolation::KeyframePhase;
pub use playback::{Frame, Playback, PlaybackOptions};
pub use pose::PoseBuffer;
pub use skeleton::{Bone, BoneSpec, Skeleton};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
