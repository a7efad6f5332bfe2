//! Game configuration.
//!
//! The defaults mirror the reference behavior: 3 prospective players, a
//! 10 second answer deadline, and a fixed 10 point increment per correct
//! answer. The round count is not configured here; it is fixed by the
//! question bank's length.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Complete game configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of prospective players asked to register (1-255).
    pub expected_players: usize,

    /// Deadline for the single timed answer read each round.
    pub answer_deadline: Duration,

    /// Fixed score increment for a correct answer.
    pub points_per_correct: i64,

    /// Base seed for deterministic lifeline outcomes.
    pub seed: u64,
}

impl GameConfig {
    /// Create a config for `expected_players` with reference defaults.
    #[must_use]
    pub fn new(expected_players: usize) -> Self {
        assert!(expected_players >= 1, "Must expect at least 1 player");
        assert!(expected_players <= 255, "At most 255 players supported");
        Self {
            expected_players,
            ..Self::default()
        }
    }

    /// Override the answer deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.answer_deadline = deadline;
        self
    }

    /// Override the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            expected_players: 3,
            answer_deadline: Duration::from_secs(10),
            points_per_correct: 10,
            seed: 0,
        }
    }
}
