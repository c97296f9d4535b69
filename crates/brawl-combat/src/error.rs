//! Error types for combat setup
//!
//! All variants are load-time failures; once a [`crate::MoveSet`] and
//! [`crate::combo::ComboBook`] are built, the per-tick combat path does not
//! produce errors.

use thiserror::Error;

/// Errors raised while building combat data
#[derive(Debug, Error)]
pub enum CombatError {
    /// Combo book has no sequences
    #[error("combo book must define at least one sequence")]
    EmptyBook,

    /// A combo sequence has no moves
    #[error("combo sequence for finisher '{finisher}' has no moves")]
    EmptySequence {
        /// Finisher clip of the empty sequence
        finisher: String,
    },

    /// One sequence is a prefix of (or equal to) another
    ///
    /// Such a book is unplayable: the shorter sequence always completes
    /// first and the longer one can never be reached.
    #[error("combo sequence {shorter:?} shadows {longer:?}")]
    AmbiguousSequences {
        /// The sequence that would always win
        shorter: Vec<String>,
        /// The sequence made unreachable
        longer: Vec<String>,
    },

    /// A move set entry names a clip that was not provided
    #[error("move set is missing clip '{clip}' required by {role}")]
    MissingClip {
        /// Clip name the move set expects
        clip: String,
        /// What references it (an attack, a finisher, the recovery)
        role: &'static str,
    },

    /// A clip registered as an attack or finisher is not a one-shot
    #[error("clip '{clip}' must be one-shot to be used as {role}")]
    NotOneShot {
        /// Offending clip
        clip: String,
        /// What it was registered as
        role: &'static str,
    },

    /// Animation-layer failure while binding clips
    #[error("animation error: {0}")]
    Anim(#[from] brawl_anim::AnimError),
}

/// Result type for combat operations
pub type Result<T> = std::result::Result<T, CombatError>;
