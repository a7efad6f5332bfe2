//! Core engine types: players, questions, RNG, configuration.
//!
//! These are the building blocks shared by every stage of a game; the
//! phased coordination itself lives in `sync` and `game`.

pub mod config;
pub mod player;
pub mod question;
pub mod rng;

pub use config::GameConfig;
pub use player::{LifelineFlags, PlayerId, PlayerSlot, PlayerState};
pub use question::{OptionLabel, Question, QuestionBank, StaticBank};
pub use rng::GameRng;
