//! Per-fighter state: move table, playback, and combo tracking
//!
//! A [`Fighter`] is the explicit per-instance state for one character, be it
//! the locally controlled player or a network puppet. It owns the mutable
//! pieces (playback, combo tracker) and shares the immutable ones (clips,
//! combo book) via `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use brawl_anim::{BoundClip, ClipMode, Frame, Playback, PlaybackOptions};

use crate::combo::{ComboBook, ComboOutcome, ComboTracker};
use crate::error::{CombatError, Result};

/// A fighter's clip table, validated against its combo book
///
/// Holds every clip the fighter can play, keyed by name, plus the roles the
/// combat layer cares about: which clip is the recovery, and which clips are
/// finishers. Attacks are one-shot clips that are neither; movement and idle
/// loops fall out of every combat rule by being `Loop` mode.
#[derive(Debug)]
pub struct MoveSet {
    clips: HashMap<String, Arc<BoundClip>>,
    recovery: String,
    finishers: HashSet<String>,
    book: Arc<ComboBook>,
}

impl MoveSet {
    /// Build a move set, checking every clip the book refers to
    ///
    /// Every attack named by a combo sequence and every finisher must be
    /// present and one-shot; the recovery clip must be present. Broken
    /// references are load-time errors, not silent no-ops in a fight.
    pub fn new(
        clips: HashMap<String, Arc<BoundClip>>,
        recovery: impl Into<String>,
        book: Arc<ComboBook>,
    ) -> Result<Self> {
        let recovery = recovery.into();
        if !clips.contains_key(&recovery) {
            return Err(CombatError::MissingClip {
                clip: recovery,
                role: "recovery",
            });
        }

        let mut finishers = HashSet::new();
        for sequence in book.sequences() {
            for attack in sequence.moves() {
                check_one_shot(&clips, attack, "a combo attack")?;
            }
            check_one_shot(&clips, sequence.finisher(), "a finisher")?;
            finishers.insert(sequence.finisher().to_string());
        }

        Ok(Self {
            clips,
            recovery,
            finishers,
            book,
        })
    }

    /// Look up a clip by name
    pub fn clip(&self, name: &str) -> Option<&Arc<BoundClip>> {
        self.clips.get(name)
    }

    /// The recovery clip played after a broken combo
    pub fn recovery_clip(&self) -> &Arc<BoundClip> {
        // Presence is validated in `new`.
        &self.clips[&self.recovery]
    }

    /// The shared combo book
    pub fn book(&self) -> &Arc<ComboBook> {
        &self.book
    }

    /// Whether a clip counts as an attack for combo purposes
    ///
    /// One-shot, not the recovery, not a finisher. Only attack completions
    /// feed the combo tracker.
    pub fn is_attack(&self, name: &str) -> bool {
        self.clips
            .get(name)
            .is_some_and(|clip| clip.mode() == ClipMode::OneShot)
            && name != self.recovery
            && !self.finishers.contains(name)
    }
}

fn check_one_shot(
    clips: &HashMap<String, Arc<BoundClip>>,
    name: &str,
    role: &'static str,
) -> Result<()> {
    match clips.get(name) {
        None => Err(CombatError::MissingClip {
            clip: name.to_string(),
            role,
        }),
        Some(clip) if clip.mode() != ClipMode::OneShot => Err(CombatError::NotOneShot {
            clip: name.to_string(),
            role,
        }),
        Some(_) => Ok(()),
    }
}

/// Snapshot of a fighter's animation state for network replication
///
/// What an observer needs to mirror this fighter: the active clip, how far
/// into it the fighter is, and the latest combo event (so the server can
/// relay completions and resets).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicationState {
    /// Name of the active clip
    pub clip: String,
    /// Seconds into the active clip
    pub elapsed: f32,
    /// Most recent combo outcome, if any attack has completed yet
    pub outcome: Option<ComboOutcome>,
}

/// One character's combat-animation state machine
#[derive(Debug)]
pub struct Fighter {
    moves: MoveSet,
    playback: Playback,
    combo: ComboTracker,
    last_outcome: Option<ComboOutcome>,
}

impl Fighter {
    /// Create a fighter over a validated move set
    pub fn new(moves: MoveSet, options: PlaybackOptions) -> Self {
        let combo = ComboTracker::new(Arc::clone(moves.book()));
        Self {
            moves,
            playback: Playback::new(options),
            combo,
            last_outcome: None,
        }
    }

    /// The fighter's move table
    pub fn moves(&self) -> &MoveSet {
        &self.moves
    }

    /// Request a clip by name; returns whether playback switched
    ///
    /// Subject to the playback interruption rules: requests against an
    /// unfinished one-shot are dropped. Unknown names are ignored.
    pub fn request_move(&mut self, name: &str, now: f64) -> bool {
        match self.moves.clips.get(name) {
            Some(clip) => self.playback.request(clip, now),
            None => {
                log::warn!("move request for unknown clip '{name}'");
                false
            }
        }
    }

    /// Advance one tick: drive playback and react to attack completions
    ///
    /// When an attack clip completes this tick, its name is fed to the combo
    /// tracker; a failed chain retargets playback to the recovery clip and a
    /// completed chain to the matched sequence's finisher. The returned frame
    /// still describes the clip that played this tick.
    pub fn tick(&mut self, now: f64) -> Option<Frame> {
        let frame = self.playback.advance(now)?;

        if frame.just_completed && self.moves.is_attack(frame.clip.name()) {
            let outcome = self.combo.on_attack(frame.clip.name());
            self.last_outcome = Some(outcome);
            match outcome {
                ComboOutcome::Failed => {
                    let recovery = Arc::clone(self.moves.recovery_clip());
                    self.playback.request(&recovery, now);
                }
                ComboOutcome::Completed { sequence } => {
                    if let Some(sequence) = self.moves.book.sequence(sequence) {
                        if let Some(finisher) = self.moves.clips.get(sequence.finisher()) {
                            let finisher = Arc::clone(finisher);
                            self.playback.request(&finisher, now);
                        }
                    }
                }
                ComboOutcome::InProgress => {}
            }
        }

        Some(frame)
    }

    /// Name of the clip currently playing
    pub fn active_clip_name(&self) -> Option<&str> {
        self.playback.active_clip_name()
    }

    /// Latest combo outcome, if any attack has completed
    pub fn last_outcome(&self) -> Option<ComboOutcome> {
        self.last_outcome
    }

    /// Snapshot for the network layer; `None` while nothing is playing
    pub fn replication_state(&self, now: f64) -> Option<ReplicationState> {
        let clip = self.playback.active_clip_name()?.to_string();
        let elapsed = self.playback.elapsed(now).unwrap_or(0.0) as f32;
        Some(ReplicationState {
            clip,
            elapsed,
            outcome: self.last_outcome,
        })
    }
}
