//! # rust-quiz
//!
//! A concurrent multiplayer quiz engine: N player tasks progress through a
//! multi-round contest in lockstep, with one-shot lifelines and a timed
//! answer race per round.
//!
//! ## Design Principles
//!
//! 1. **Lockstep phases**: nobody is scored before everyone has answered,
//!    and nobody starts a round before everyone's score from the previous
//!    round is final. The registration gate and the reusable round barrier
//!    enforce this; each player arrives at the barrier exactly twice per
//!    round.
//!
//! 2. **Own-state mutation only**: a player's score is touched only by
//!    that player's own evaluation step. The roster is append-only under a
//!    lock during registration and frozen afterwards.
//!
//! 3. **Cancellable deadline race**: the timed answer read is dropped when
//!    the countdown wins, so late input is discarded instead of leaking
//!    into a later round.
//!
//! 4. **Abstract collaborators**: question content ([`QuestionBank`]) and
//!    the prompt/response surface ([`io::IoChannel`]) are injected; the
//!    engine only reads questions and exchanges lines of text.
//!
//! ## Modules
//!
//! - `core`: players, questions, RNG, configuration
//! - `sync`: registration gate and round barrier
//! - `io`: the shared I/O channel (console and scripted)
//! - `lifelines`: one-shot narrowing / suggestion / poll assists
//! - `answer`: validation, scoring, and the timed answer collector
//! - `game`: the driver wiring it all together
//! - `scoreboard`: final standings and the co-winner set

pub mod answer;
pub mod core;
pub mod game;
pub mod io;
pub mod lifelines;
pub mod scoreboard;
pub mod sync;

// Re-export commonly used types
pub use crate::core::{
    GameConfig, GameRng, LifelineFlags, OptionLabel, PlayerId, PlayerSlot, PlayerState, Question,
    QuestionBank, StaticBank,
};

pub use crate::answer::{collect_timed_answer, evaluate, validate_answer};
pub use crate::game::{GameOutcome, QuizError, QuizGame};
pub use crate::io::{ConsoleIo, IoChannel, ScriptedIo};
pub use crate::lifelines::{HiddenOptions, LifelineKind, LifelineOutcome};
pub use crate::scoreboard::{Scoreboard, Standing};
pub use crate::sync::{RegistrationGate, RoundBarrier};
