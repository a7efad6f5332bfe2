//! Player identification and per-player game records.
//!
//! ## PlayerId
//!
//! Type-safe seat identifier supporting up to 255 players.
//!
//! ## PlayerState
//!
//! The mutable record owned by one player task: score, one-shot lifeline
//! flags, and the answer submitted for the current round. The score is only
//! ever changed by that player's own evaluation step; the scoreboard reads
//! it once all rounds are done.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::question::OptionLabel;
use crate::lifelines::LifelineKind;

/// Seat identifier supporting up to 255 players.
///
/// Seat indices are 0-based: the first seat is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new seat ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seat IDs for a game with `player_count` seats.
    ///
    /// ```
    /// use rust_quiz::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::all(3).collect();
    /// assert_eq!(seats.len(), 3);
    /// assert_eq!(seats[0], PlayerId::new(0));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// One-shot consumption flags, one per lifeline kind.
///
/// Each flag transitions false→true at most once per game and never resets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelineFlags {
    pub narrow: bool,
    pub suggest: bool,
    pub poll: bool,
}

impl LifelineFlags {
    /// Check whether a lifeline has already been consumed.
    #[must_use]
    pub fn is_used(&self, kind: LifelineKind) -> bool {
        match kind {
            LifelineKind::Narrow => self.narrow,
            LifelineKind::Suggest => self.suggest,
            LifelineKind::Poll => self.poll,
        }
    }

    /// Consume a lifeline.
    ///
    /// Returns `false` if it was already consumed (the caller must treat
    /// that as a no-op), `true` if this call flipped the flag.
    pub fn consume(&mut self, kind: LifelineKind) -> bool {
        let slot = match kind {
            LifelineKind::Narrow => &mut self.narrow,
            LifelineKind::Suggest => &mut self.suggest,
            LifelineKind::Poll => &mut self.poll,
        };
        if *slot {
            false
        } else {
            *slot = true;
            true
        }
    }
}

/// The mutable per-player record.
///
/// `answer` holds the label accepted for the current round; `None` is the
/// no-answer sentinel (deadline expired or malformed input). It is
/// overwritten every round.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Total score. Starts at 0, monotonically non-decreasing.
    pub score: i64,
    /// One-shot lifeline consumption flags.
    pub lifelines: LifelineFlags,
    /// Answer recorded for the round in progress.
    pub answer: Option<OptionLabel>,
}

/// A joined player's slot on the active roster.
///
/// Seat and display name are fixed at registration; the state behind the
/// lock is mutated only by the owning player's task. The lock is held only
/// for short, non-async critical sections.
#[derive(Debug)]
pub struct PlayerSlot {
    pub seat: PlayerId,
    pub name: String,
    pub state: Mutex<PlayerState>,
}

impl PlayerSlot {
    /// Create a fresh slot for a player who joined the game.
    #[must_use]
    pub fn new(seat: PlayerId, name: impl Into<String>) -> Self {
        Self {
            seat,
            name: name.into(),
            state: Mutex::new(PlayerState::default()),
        }
    }

    /// Read the current score.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.state.lock().expect("player state lock poisoned").score
    }
}
