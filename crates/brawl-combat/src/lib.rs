//! Combat layer for the brawler runtime
//!
//! Sits on top of [`brawl_anim`]: matches completed attack clips against a
//! book of known combo sequences and retargets playback to finisher or
//! recovery clips. [`Fighter`] bundles the per-character state; the combo
//! book and clips are shared immutable data.

pub mod combo;
pub mod error;
pub mod fighter;

// Re-export common types
pub use combo::{ComboBook, ComboOutcome, ComboSequence, ComboTracker};
pub use error::{CombatError, Result};
pub use fighter::{Fighter, MoveSet, ReplicationState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
