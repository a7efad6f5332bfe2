//! Final score aggregation and the co-winner set.
//!
//! Runs once, sequentially, after the last round's scores are final. Ties
//! are expected: every player at the maximum score is a winner, never an
//! arbitrary single pick.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PlayerSlot};

/// One player's final line on the scoreboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub seat: PlayerId,
    pub name: String,
    pub score: i64,
}

/// The final scoreboard: standings sorted by score descending, seat
/// ascending as tiebreak for stable output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    standings: Vec<Standing>,
}

impl Scoreboard {
    /// Scan the roster once and build the final standings.
    #[must_use]
    pub fn compute(roster: &[Arc<PlayerSlot>]) -> Self {
        let mut standings: Vec<Standing> = roster
            .iter()
            .map(|slot| Standing {
                seat: slot.seat,
                name: slot.name.clone(),
                score: slot.score(),
            })
            .collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score).then(a.seat.cmp(&b.seat)));
        Self { standings }
    }

    /// All standings, best first.
    #[must_use]
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    /// Every player tied at the maximum score.
    #[must_use]
    pub fn winners(&self) -> Vec<&Standing> {
        let Some(top) = self.standings.first() else {
            return Vec::new();
        };
        self.standings
            .iter()
            .filter(|s| s.score == top.score)
            .collect()
    }

    /// Winner display names, in seat order.
    #[must_use]
    pub fn winner_names(&self) -> Vec<String> {
        let mut winners = self.winners();
        winners.sort_by_key(|s| s.seat);
        winners.into_iter().map(|s| s.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roster_with_scores(scores: &[i64]) -> Vec<Arc<PlayerSlot>> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                let slot = Arc::new(PlayerSlot::new(
                    PlayerId::new(i as u8),
                    format!("P{i}"),
                ));
                slot.state.lock().unwrap().score = score;
                slot
            })
            .collect()
    }

    #[test]
    fn test_single_winner() {
        let board = Scoreboard::compute(&roster_with_scores(&[20, 10]));
        assert_eq!(board.winner_names(), vec!["P0"]);
        assert_eq!(board.standings()[0].score, 20);
        assert_eq!(board.standings()[1].score, 10);
    }

    #[test]
    fn test_ties_are_co_winners() {
        // Two players at 20 of 30, nobody above: both win.
        let board = Scoreboard::compute(&roster_with_scores(&[20, 0, 20]));
        assert_eq!(board.winner_names(), vec!["P0", "P2"]);
        assert_eq!(board.winners().len(), 2);
    }

    #[test]
    fn test_all_zero_is_a_full_tie() {
        let board = Scoreboard::compute(&roster_with_scores(&[0, 0, 0]));
        assert_eq!(board.winners().len(), 3);
    }

    #[test]
    fn test_empty_roster_has_no_winners() {
        let board = Scoreboard::compute(&[]);
        assert!(board.standings().is_empty());
        assert!(board.winners().is_empty());
    }

    #[test]
    fn test_scoreboard_serialization() {
        let board = Scoreboard::compute(&roster_with_scores(&[10, 30]));
        let json = serde_json::to_string(&board).unwrap();
        let back: Scoreboard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    proptest! {
        #[test]
        fn prop_winners_are_exactly_the_max_scorers(scores in proptest::collection::vec(0i64..=100, 1..8)) {
            let board = Scoreboard::compute(&roster_with_scores(&scores));
            let max = *scores.iter().max().unwrap();

            let expected = scores.iter().filter(|&&s| s == max).count();
            let winners = board.winners();
            prop_assert_eq!(winners.len(), expected);
            for winner in winners {
                prop_assert_eq!(winner.score, max);
            }
        }
    }
}
