//! The game driver: registration, lockstep rounds, and final report.
//!
//! One task per prospective player runs the whole
//! registration-then-rounds loop; the host (the `run` future itself)
//! conducts phase transitions. Within a round every joined player arrives
//! at the round barrier exactly twice — once after its answer is recorded
//! and once after its own score update — so evaluation never starts
//! against a half-submitted round and no player races ahead of scoring.
//!
//! The host counts as one extra barrier participant: it uses the same two
//! arrivals to place the round header before any prompt and the round
//! results after every score is final.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::answer::{collect_timed_answer, evaluate};
use crate::core::{GameConfig, GameRng, PlayerId, PlayerSlot, Question, QuestionBank};
use crate::io::IoChannel;
use crate::lifelines::{
    audience_poll, narrow_options, suggest_answer, HiddenOptions, LifelineOutcome,
};
use crate::scoreboard::Scoreboard;
use crate::sync::{RegistrationGate, RoundBarrier};

/// Errors that abort a game before it can run to a terminal state.
///
/// Input-level failures never land here; they are absorbed into round
/// state (a malformed or missing answer is just a wrong answer).
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("i/o channel failure: {0}")]
    Channel(#[from] std::io::Error),
    #[error("player task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// How a game ended. Both cases are success from the process's view.
#[derive(Debug)]
pub enum GameOutcome {
    /// All rounds played; final standings attached.
    Completed(Scoreboard),
    /// Nobody joined during registration; no round was played.
    NoPlayers,
}

/// Phase broadcast from the host to every player task.
///
/// A `watch` channel keeps only the latest phase, which is exactly the
/// rendezvous we need: a player that reaches its wait late still sees the
/// current round.
#[derive(Clone)]
enum Phase {
    Lobby,
    Round {
        index: usize,
        barrier: Arc<RoundBarrier>,
    },
    Finished,
}

/// Everything one player task needs for the full game.
struct PlayerContext {
    seat: PlayerId,
    io: Arc<dyn IoChannel>,
    bank: Arc<dyn QuestionBank>,
    gate: Arc<RegistrationGate>,
    phase_rx: watch::Receiver<Phase>,
    rng: GameRng,
    deadline: Duration,
    points: i64,
}

/// A complete quiz game over an abstract bank and I/O channel.
pub struct QuizGame {
    config: GameConfig,
    bank: Arc<dyn QuestionBank>,
    io: Arc<dyn IoChannel>,
}

impl QuizGame {
    /// Assemble a game. The bank's question count fixes the round count.
    #[must_use]
    pub fn new(config: GameConfig, bank: Arc<dyn QuestionBank>, io: Arc<dyn IoChannel>) -> Self {
        Self { config, bank, io }
    }

    /// Play one full game: registration, every round, final scoreboard.
    pub async fn run(&self) -> Result<GameOutcome, QuizError> {
        let gate = Arc::new(RegistrationGate::new(self.config.expected_players));
        let (phase_tx, phase_rx) = watch::channel(Phase::Lobby);
        let base_rng = GameRng::new(self.config.seed);

        let mut tasks = JoinSet::new();
        for seat in PlayerId::all(self.config.expected_players) {
            let ctx = PlayerContext {
                seat,
                io: self.io.clone(),
                bank: self.bank.clone(),
                gate: gate.clone(),
                phase_rx: phase_rx.clone(),
                rng: base_rng.for_context(&format!("player-{}", seat.index())),
                deadline: self.config.answer_deadline,
                points: self.config.points_per_correct,
            };
            tasks.spawn(player_loop(ctx));
        }
        // Keeping phase_rx alive here means phase_tx.send can never fail.

        gate.closed().await;
        let roster = gate.roster();

        if roster.is_empty() {
            info!("no players joined, canceling the game");
            self.io
                .announce("\n❌ No players joined. Game canceled.")
                .await?;
            let _ = phase_tx.send(Phase::Finished);
            Self::drain(&mut tasks).await?;
            return Ok(GameOutcome::NoPlayers);
        }

        info!(players = roster.len(), rounds = self.bank.len(), "game starting");
        self.io
            .announce(&format!(
                "\n🎮 Game starting with {} player(s)...",
                roster.len()
            ))
            .await?;

        // Sized once from the frozen roster, plus the host, reused for
        // every round.
        let barrier = Arc::new(RoundBarrier::new(roster.len() + 1));

        for round in 0..self.bank.len() {
            let question = self.bank.get(round);
            self.announce_header(round, question).await?;
            let _ = phase_tx.send(Phase::Round {
                index: round,
                barrier: barrier.clone(),
            });

            barrier.await_answers().await;
            // Every player evaluates its own score between the arrivals.
            barrier.await_scores().await;

            self.announce_results(round, question, &roster).await?;
        }

        let _ = phase_tx.send(Phase::Finished);
        Self::drain(&mut tasks).await?;

        let board = Scoreboard::compute(&roster);
        self.io
            .announce(&format!(
                "\n🏆 Winner(s): {}",
                board.winner_names().join(" ")
            ))
            .await?;
        Ok(GameOutcome::Completed(board))
    }

    async fn drain(tasks: &mut JoinSet<()>) -> Result<(), QuizError> {
        while let Some(result) = tasks.join_next().await {
            result?;
        }
        Ok(())
    }

    async fn announce_header(&self, round: usize, question: &Question) -> Result<(), QuizError> {
        let mut header = format!("\n🟦 Round {} 🟦\n{}\n", round + 1, question.text);
        for (label, text) in question.options() {
            header.push_str(&format!("  {label}) {text}\n"));
        }
        header.push_str("=========================");
        self.io.announce(&header).await?;
        Ok(())
    }

    async fn announce_results(
        &self,
        round: usize,
        question: &Question,
        roster: &[Arc<PlayerSlot>],
    ) -> Result<(), QuizError> {
        let mut report = format!("\n✅ Round {} results:\n", round + 1);
        for slot in roster {
            let state = slot.state.lock().expect("player state lock poisoned");
            let answered = match state.answer {
                Some(label) => format!("answered {label}"),
                None => "gave no answer".to_string(),
            };
            let verdict = if state.answer == Some(question.correct()) {
                format!("correct, +{} points", self.config.points_per_correct)
            } else {
                "wrong, no points".to_string()
            };
            report.push_str(&format!("{} {answered} - {verdict}\n", slot.name));
        }
        report.push_str(&format!("\n📊 Scores after round {}:\n", round + 1));
        for slot in roster {
            report.push_str(&format!("{}: {} points\n", slot.name, slot.score()));
        }
        self.io.announce(report.trim_end()).await?;
        Ok(())
    }
}

/// Prompt, absorbing channel failures into an empty line.
///
/// A task abandoning a round between barrier arrivals would deadlock every
/// other player, so nothing inside the round loop is allowed to fail.
async fn prompt_or_empty(io: &dyn IoChannel, seat: PlayerId, text: &str) -> String {
    match io.prompt(seat, text).await {
        Ok(line) => line,
        Err(e) => {
            warn!(%seat, error = %e, "prompt failed, treating as empty input");
            String::new()
        }
    }
}

/// The full per-player loop: register, then play every round in lockstep.
async fn player_loop(mut ctx: PlayerContext) {
    let slot = register(&ctx).await;
    ctx.gate.decide(slot.clone()).await;
    let Some(slot) = slot else {
        // Declined: done after the gate; never touches the round barrier.
        return;
    };

    let mut next_round = 0usize;
    loop {
        let phase = match ctx
            .phase_rx
            .wait_for(|phase| match phase {
                Phase::Round { index, .. } => *index == next_round,
                Phase::Finished => true,
                Phase::Lobby => false,
            })
            .await
        {
            Ok(phase) => phase.clone(),
            // Host dropped the channel; nothing left to play.
            Err(_) => return,
        };

        let (round, barrier) = match phase {
            Phase::Round { index, barrier } => (index, barrier),
            _ => return,
        };

        play_round(&mut ctx, &slot, round, &barrier).await;
        next_round = round + 1;
    }
}

/// Ask for a name and a join decision over the shared channel.
async fn register(ctx: &PlayerContext) -> Option<Arc<PlayerSlot>> {
    let name = prompt_or_empty(
        ctx.io.as_ref(),
        ctx.seat,
        &format!("{}, enter your name: ", ctx.seat),
    )
    .await;
    let name = match name.trim() {
        "" => ctx.seat.to_string(),
        trimmed => trimmed.to_string(),
    };

    let reply = prompt_or_empty(
        ctx.io.as_ref(),
        ctx.seat,
        &format!("[{name}] Do you want to join the quiz? (yes/no): "),
    )
    .await;
    let joined = matches!(reply.trim().to_ascii_lowercase().as_str(), "yes" | "y");

    let note = if joined {
        format!("[{name}] has joined the quiz!")
    } else {
        format!("[{name}] chose not to join.")
    };
    if let Err(e) = ctx.io.announce(&note).await {
        warn!(seat = %ctx.seat, error = %e, "announce failed");
    }

    joined.then(|| Arc::new(PlayerSlot::new(ctx.seat, name)))
}

/// One round for one player: lifelines, timed answer, the two barrier
/// arrivals with the player's own evaluation in between.
async fn play_round(
    ctx: &mut PlayerContext,
    slot: &Arc<PlayerSlot>,
    round: usize,
    barrier: &RoundBarrier,
) {
    let bank = ctx.bank.clone();
    let question = bank.get(round);
    let mut hidden = HiddenOptions::new();

    lifeline_phase(ctx, slot, question, &mut hidden).await;

    let answer = collect_timed_answer(
        ctx.io.as_ref(),
        slot.seat,
        &slot.name,
        question,
        &hidden,
        ctx.deadline,
    )
    .await;
    {
        let mut state = slot.state.lock().expect("player state lock poisoned");
        state.answer = answer;
    }
    debug!(seat = %slot.seat, round, answer = ?answer, "answer recorded");
    barrier.await_answers().await;

    {
        let mut state = slot.state.lock().expect("player state lock poisoned");
        let correct = evaluate(&mut state, question, ctx.points);
        debug!(seat = %slot.seat, round, correct, score = state.score, "score updated");
    }
    barrier.await_scores().await;
}

/// The untimed pre-answer command loop.
///
/// Re-prompts until `ready`; unrecognized commands and already-used
/// lifelines both keep the loop going. Only the timed read that follows is
/// one-shot.
async fn lifeline_phase(
    ctx: &mut PlayerContext,
    slot: &Arc<PlayerSlot>,
    question: &Question,
    hidden: &mut HiddenOptions,
) {
    loop {
        let line = prompt_or_empty(
            ctx.io.as_ref(),
            slot.seat,
            &format!(
                "[{}] Lifeline (5050/expert/poll) or 'ready' to answer: ",
                slot.name
            ),
        )
        .await;
        let command = line.trim().to_ascii_lowercase();

        let outcome = match command.as_str() {
            // An empty line is also what a closed input stream produces;
            // treating it as ready keeps the loop from spinning forever.
            "" | "ready" => break,
            "5050" | "50:50" | "50" => {
                let mut state = slot.state.lock().expect("player state lock poisoned");
                narrow_options(question, &mut state, hidden, &mut ctx.rng)
            }
            "expert" | "phone" => {
                let mut state = slot.state.lock().expect("player state lock poisoned");
                suggest_answer(question, &mut state, &mut ctx.rng)
            }
            "poll" | "audience" => {
                let mut state = slot.state.lock().expect("player state lock poisoned");
                audience_poll(question, &mut state, &mut ctx.rng)
            }
            other => {
                let note = format!(
                    "[{}] Unknown command '{other}'. Use 5050, expert, poll, or ready.",
                    slot.name
                );
                if let Err(e) = ctx.io.announce(&note).await {
                    warn!(seat = %slot.seat, error = %e, "announce failed");
                }
                continue;
            }
        };

        let note = describe_outcome(&slot.name, &outcome);
        if let Err(e) = ctx.io.announce(&note).await {
            warn!(seat = %slot.seat, error = %e, "announce failed");
        }
    }
}

fn describe_outcome(name: &str, outcome: &LifelineOutcome) -> String {
    match outcome {
        LifelineOutcome::AlreadyUsed(kind) => {
            format!("[{name}] The {kind} lifeline is already used.")
        }
        LifelineOutcome::Narrowed(labels) => {
            let removed: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
            format!("[{name}] 50:50 removes: {}", removed.join(" and "))
        }
        LifelineOutcome::Suggestion(label) => {
            format!("[{name}] The expert suggests: {label}")
        }
        LifelineOutcome::Poll(percentages) => {
            let shares: Vec<String> = percentages
                .iter()
                .map(|(label, pct)| format!("{label} {pct}%"))
                .collect();
            format!("[{name}] Audience poll: {}", shares.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_outcome_formats() {
        let narrowed = LifelineOutcome::Narrowed(smallvec::SmallVec::from_slice(&[
            crate::core::OptionLabel('A'),
            crate::core::OptionLabel('D'),
        ]));
        assert_eq!(
            describe_outcome("Ada", &narrowed),
            "[Ada] 50:50 removes: A and D"
        );

        let used = LifelineOutcome::AlreadyUsed(crate::lifelines::LifelineKind::Narrow);
        assert_eq!(
            describe_outcome("Ada", &used),
            "[Ada] The 50:50 lifeline is already used."
        );
    }
}
