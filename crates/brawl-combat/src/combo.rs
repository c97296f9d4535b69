//! Combo matching over completed attacks
//!
//! A [`ComboBook`] is the immutable set of known attack sequences, shared
//! between all fighters. Each fighter owns a [`ComboTracker`], which matches
//! completed attacks against the book by narrowing an index set over it; the
//! sequences themselves are never copied per instance.

use std::sync::Arc;

use crate::error::{CombatError, Result};

/// One known combo: an ordered attack sequence and its payoff clip
#[derive(Debug, Clone)]
pub struct ComboSequence {
    moves: Vec<String>,
    finisher: String,
}

impl ComboSequence {
    /// Create a sequence; emptiness is checked when the book is built
    pub fn new(moves: Vec<impl Into<String>>, finisher: impl Into<String>) -> Self {
        Self {
            moves: moves.into_iter().map(Into::into).collect(),
            finisher: finisher.into(),
        }
    }

    /// The attack clip names, in required order
    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Clip played when the sequence completes
    pub fn finisher(&self) -> &str {
        &self.finisher
    }
}

/// The immutable set of known combo sequences
///
/// Construction rejects books where one sequence shadows another (equal, or
/// a prefix of it): the shorter sequence would always complete first and the
/// longer one could never fire. That is a content-design error, caught at
/// load rather than resolved by an arbitrary tie-break in play.
#[derive(Debug)]
pub struct ComboBook {
    sequences: Vec<ComboSequence>,
}

impl ComboBook {
    /// Build a validated book
    pub fn new(sequences: Vec<ComboSequence>) -> Result<Self> {
        if sequences.is_empty() {
            return Err(CombatError::EmptyBook);
        }
        for sequence in &sequences {
            if sequence.moves.is_empty() {
                return Err(CombatError::EmptySequence {
                    finisher: sequence.finisher.clone(),
                });
            }
        }
        for (i, a) in sequences.iter().enumerate() {
            for b in &sequences[i + 1..] {
                let (shorter, longer) = if a.moves.len() <= b.moves.len() {
                    (a, b)
                } else {
                    (b, a)
                };
                if longer.moves.starts_with(&shorter.moves) {
                    return Err(CombatError::AmbiguousSequences {
                        shorter: shorter.moves.clone(),
                        longer: longer.moves.clone(),
                    });
                }
            }
        }

        log::debug!("combo book loaded with {} sequences", sequences.len());
        Ok(Self { sequences })
    }

    /// Number of sequences
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the book is empty (never true for a constructed book)
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Sequence at the given index
    pub fn sequence(&self, index: usize) -> Option<&ComboSequence> {
        self.sequences.get(index)
    }

    /// All sequences
    pub fn sequences(&self) -> &[ComboSequence] {
        &self.sequences
    }
}

/// Result of feeding one completed attack to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComboOutcome {
    /// The attack extends at least one known sequence
    InProgress,
    /// A full sequence matched; `sequence` indexes into the book
    Completed {
        /// Index of the matched sequence in the [`ComboBook`]
        sequence: usize,
    },
    /// The attack matched no remaining sequence; the tracker reset
    Failed,
}

/// Per-fighter combo matching state
///
/// `candidates` holds indices into the shared book; matching narrows the set
/// in place and resets it after every terminal outcome.
#[derive(Debug)]
pub struct ComboTracker {
    book: Arc<ComboBook>,
    candidates: Vec<usize>,
    position: usize,
}

impl ComboTracker {
    /// Create a tracker over a shared book, starting from the full set
    pub fn new(book: Arc<ComboBook>) -> Self {
        let candidates = (0..book.len()).collect();
        Self {
            book,
            candidates,
            position: 0,
        }
    }

    /// The shared book this tracker matches against
    pub fn book(&self) -> &Arc<ComboBook> {
        &self.book
    }

    /// How many attacks of the current chain have matched so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Forget the current chain and start over from the full candidate set
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.candidates.extend(0..self.book.len());
        self.position = 0;
    }

    /// Feed one completed attack and report the chain's state
    ///
    /// Call this only for attack clips; movement, idle, recovery and
    /// finisher completions must not reach the tracker. On `Failed` and
    /// `Completed` the tracker has already reset for the next chain.
    pub fn on_attack(&mut self, attack: &str) -> ComboOutcome {
        let position = self.position;
        self.candidates.retain(|&index| {
            self.book.sequences[index]
                .moves
                .get(position)
                .is_some_and(|m| m == attack)
        });

        if self.candidates.is_empty() {
            log::debug!("combo broken at position {position} by '{attack}'");
            self.reset();
            return ComboOutcome::Failed;
        }

        // Shadowed sequences are rejected at load, so at most one candidate
        // can end at the current position.
        if let [index] = self.candidates[..] {
            if self.position + 1 == self.book.sequences[index].moves.len() {
                log::debug!(
                    "combo completed: finisher '{}'",
                    self.book.sequences[index].finisher
                );
                self.reset();
                return ComboOutcome::Completed { sequence: index };
            }
        }

        self.position += 1;
        ComboOutcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Arc<ComboBook> {
        Arc::new(
            ComboBook::new(vec![
                ComboSequence::new(vec!["punch_l", "kick_l", "punch_r"], "uppercut"),
                ComboSequence::new(vec!["punch_l", "punch_r"], "haymaker"),
            ])
            .expect("valid book"),
        )
    }

    #[test]
    fn test_empty_book_rejected() {
        assert!(matches!(
            ComboBook::new(Vec::new()).unwrap_err(),
            CombatError::EmptyBook
        ));
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = ComboBook::new(vec![ComboSequence::new(Vec::<String>::new(), "slam")])
            .unwrap_err();
        assert!(matches!(err, CombatError::EmptySequence { .. }));
    }

    #[test]
    fn test_prefix_sequence_rejected() {
        let err = ComboBook::new(vec![
            ComboSequence::new(vec!["punch_l", "punch_r"], "haymaker"),
            ComboSequence::new(vec!["punch_l", "punch_r", "kick_l"], "slam"),
        ])
        .unwrap_err();
        assert!(matches!(err, CombatError::AmbiguousSequences { .. }));
    }

    #[test]
    fn test_duplicate_sequence_rejected() {
        let err = ComboBook::new(vec![
            ComboSequence::new(vec!["kick_l"], "slam"),
            ComboSequence::new(vec!["kick_l"], "stomp"),
        ])
        .unwrap_err();
        assert!(matches!(err, CombatError::AmbiguousSequences { .. }));
    }

    #[test]
    fn test_shared_prefix_resolved_by_elimination() {
        // punch_l keeps both sequences alive; punch_r eliminates the longer
        // one and completes the shorter.
        let mut tracker = ComboTracker::new(book());
        assert_eq!(tracker.on_attack("punch_l"), ComboOutcome::InProgress);
        assert_eq!(
            tracker.on_attack("punch_r"),
            ComboOutcome::Completed { sequence: 1 }
        );
        assert_eq!(tracker.position(), 0);
    }

    #[test]
    fn test_longer_sequence_completes() {
        let mut tracker = ComboTracker::new(book());
        assert_eq!(tracker.on_attack("punch_l"), ComboOutcome::InProgress);
        assert_eq!(tracker.on_attack("kick_l"), ComboOutcome::InProgress);
        assert_eq!(
            tracker.on_attack("punch_r"),
            ComboOutcome::Completed { sequence: 0 }
        );
    }

    #[test]
    fn test_mismatch_deep_in_chain_fails() {
        // punch_l, kick_l narrows to the three-move sequence; a second
        // kick_l where punch_r is expected breaks the chain.
        let mut tracker = ComboTracker::new(book());
        assert_eq!(tracker.on_attack("punch_l"), ComboOutcome::InProgress);
        assert_eq!(tracker.on_attack("kick_l"), ComboOutcome::InProgress);
        assert_eq!(tracker.on_attack("kick_l"), ComboOutcome::Failed);
        assert_eq!(tracker.position(), 0);
    }

    #[test]
    fn test_mismatch_fails_and_resets() {
        let mut tracker = ComboTracker::new(book());
        assert_eq!(tracker.on_attack("punch_l"), ComboOutcome::InProgress);
        assert_eq!(tracker.on_attack("kick_r"), ComboOutcome::Failed);

        // The reset restores the full candidate set; a fresh chain works.
        assert_eq!(tracker.on_attack("punch_l"), ComboOutcome::InProgress);
        assert_eq!(
            tracker.on_attack("punch_r"),
            ComboOutcome::Completed { sequence: 1 }
        );
    }

    #[test]
    fn test_unknown_first_attack_fails() {
        let mut tracker = ComboTracker::new(book());
        assert_eq!(tracker.on_attack("headbutt"), ComboOutcome::Failed);
        assert_eq!(tracker.position(), 0);
    }

    #[test]
    fn test_completion_resets_for_next_chain() {
        let mut tracker = ComboTracker::new(book());
        tracker.on_attack("punch_l");
        tracker.on_attack("kick_l");
        tracker.on_attack("punch_r");

        assert_eq!(tracker.on_attack("punch_l"), ComboOutcome::InProgress);
        assert_eq!(tracker.on_attack("kick_l"), ComboOutcome::InProgress);
        assert_eq!(
            tracker.on_attack("punch_r"),
            ComboOutcome::Completed { sequence: 0 }
        );
    }
}
