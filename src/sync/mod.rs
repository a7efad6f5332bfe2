//! Phase rendezvous primitives: the one-shot registration gate and the
//! reusable round barrier.
//!
//! ## RegistrationGate
//!
//! Every prospective player makes exactly one join/decline decision, then
//! blocks until all expected decisions are in; the gate releases everyone
//! together, once. The active roster is append-only under the gate's lock
//! while registration is open and frozen afterwards.
//!
//! ## RoundBarrier
//!
//! A reusable rendezvous sized once from the post-registration roster.
//! Each participant arrives exactly twice per round: after submitting an
//! answer and after its score update. The two arrivals are deliberately
//! separate calls so the answer → evaluate → proceed ordering stays
//! explicit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{watch, Barrier};
use tracing::debug;

use crate::core::PlayerSlot;

/// One-shot rendezvous that closes registration.
///
/// `expected` counts decision-makers. The game host is not one of them; it
/// observes closure through [`RegistrationGate::closed`].
pub struct RegistrationGate {
    expected: usize,
    barrier: Barrier,
    roster: StdMutex<Vec<Arc<PlayerSlot>>>,
    decided: AtomicUsize,
    closed_tx: watch::Sender<bool>,
}

impl RegistrationGate {
    /// Create a gate expecting `expected` decisions.
    #[must_use]
    pub fn new(expected: usize) -> Self {
        assert!(expected >= 1, "Gate needs at least 1 expected decision");
        let (closed_tx, _) = watch::channel(false);
        Self {
            expected,
            barrier: Barrier::new(expected),
            roster: StdMutex::new(Vec::new()),
            decided: AtomicUsize::new(0),
            closed_tx,
        }
    }

    /// Record one player's decision, then block until everyone has decided.
    ///
    /// `Some(slot)` joins the active roster; `None` declines. Either way
    /// the decision counts toward the gate, so a declining player can
    /// never stall the release. Must be called exactly once per
    /// prospective player.
    pub async fn decide(&self, slot: Option<Arc<PlayerSlot>>) {
        if let Some(slot) = slot {
            let mut roster = self.roster.lock().expect("roster lock poisoned");
            debug!(seat = %slot.seat, name = %slot.name, "joined the roster");
            roster.push(slot);
        }

        let decided = self.decided.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(decided <= self.expected, "More decisions than expected");
        if decided == self.expected {
            // Roster is frozen from here on. send_replace stores the value
            // even when nobody has subscribed yet.
            self.closed_tx.send_replace(true);
        }

        self.barrier.wait().await;
    }

    /// Wait until every expected decision is in.
    ///
    /// Resolves even when everyone declined; an empty roster is a normal
    /// outcome the caller must check for.
    pub async fn closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        rx.wait_for(|closed| *closed)
            .await
            .expect("gate sender owned by self");
    }

    /// Snapshot of the active roster, ordered by seat.
    ///
    /// Stable once [`RegistrationGate::closed`] has resolved.
    #[must_use]
    pub fn roster(&self) -> Vec<Arc<PlayerSlot>> {
        let mut roster = self.roster.lock().expect("roster lock poisoned").clone();
        roster.sort_by_key(|slot| slot.seat);
        roster
    }
}

/// Reusable rendezvous for the two phase transitions inside a round.
///
/// Sized once at game start (active roster plus the host) and never
/// resized. Releases all waiters atomically on the Nth arrival, then
/// resets for the next use.
pub struct RoundBarrier {
    inner: Barrier,
    participants: usize,
}

impl RoundBarrier {
    /// Create a barrier for a fixed set of participants.
    #[must_use]
    pub fn new(participants: usize) -> Self {
        assert!(participants >= 1, "Barrier needs at least 1 participant");
        Self {
            inner: Barrier::new(participants),
            participants,
        }
    }

    /// Number of participants required per arrival.
    #[must_use]
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// First arrival of a round: this participant's answer is recorded.
    ///
    /// Blocks until every participant has answered, so evaluation never
    /// starts against a half-submitted round.
    pub async fn await_answers(&self) {
        self.inner.wait().await;
    }

    /// Second arrival of a round: this participant's score is final.
    ///
    /// Blocks until every score update is done, so nobody starts the next
    /// round's lifeline or timer logic against stale scores.
    pub async fn await_scores(&self) {
        self.inner.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_gate_releases_only_after_all_decisions() {
        let gate = Arc::new(RegistrationGate::new(3));
        let released = Arc::new(AtomicUsize::new(0));

        for seat in 0..2u8 {
            let gate = gate.clone();
            let released = released.clone();
            tokio::spawn(async move {
                let slot = Arc::new(PlayerSlot::new(PlayerId::new(seat), format!("P{seat}")));
                gate.decide(Some(slot)).await;
                released.fetch_add(1, Ordering::SeqCst);
            });
        }

        // Two of three have decided: nobody may be through yet.
        settle().await;
        assert_eq!(released.load(Ordering::SeqCst), 0);

        // Third decision (a decline) releases everyone together.
        let last = {
            let gate = gate.clone();
            let released = released.clone();
            tokio::spawn(async move {
                gate.decide(None).await;
                released.fetch_add(1, Ordering::SeqCst);
            })
        };
        last.await.unwrap();
        settle().await;
        assert_eq!(released.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gate_roster_is_sorted_and_excludes_declines() {
        let gate = Arc::new(RegistrationGate::new(3));

        let mut handles = Vec::new();
        // Seats decide in reverse order; seat 1 declines.
        for seat in [2u8, 1, 0] {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                let slot = (seat != 1)
                    .then(|| Arc::new(PlayerSlot::new(PlayerId::new(seat), format!("P{seat}"))));
                gate.decide(slot).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        gate.closed().await;
        let roster = gate.roster();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].seat, PlayerId::new(0));
        assert_eq!(roster[1].seat, PlayerId::new(2));
    }

    #[tokio::test]
    async fn test_gate_closes_when_everyone_declines() {
        let gate = Arc::new(RegistrationGate::new(2));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.decide(None).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        gate.closed().await;
        assert!(gate.roster().is_empty());
    }

    #[tokio::test]
    async fn test_barrier_releases_on_nth_arrival_only() {
        let barrier = Arc::new(RoundBarrier::new(3));
        let through = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let barrier = barrier.clone();
            let through = through.clone();
            tokio::spawn(async move {
                barrier.await_answers().await;
                through.fetch_add(1, Ordering::SeqCst);
            });
        }

        settle().await;
        assert_eq!(through.load(Ordering::SeqCst), 0, "no waiter may proceed early");

        barrier.await_answers().await;
        settle().await;
        assert_eq!(through.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_barrier_is_reusable_across_rounds() {
        let barrier = Arc::new(RoundBarrier::new(2));

        for _round in 0..3 {
            let other = {
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.await_answers().await;
                    barrier.await_scores().await;
                })
            };
            barrier.await_answers().await;
            barrier.await_scores().await;
            other.await.unwrap();
        }
    }
}
