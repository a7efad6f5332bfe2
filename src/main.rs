//! Console runner: the reference three-player, three-round trivia game.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use rust_quiz::{ConsoleIo, GameConfig, GameOutcome, QuizGame, StaticBank};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let seed = match std::env::var("QUIZ_SEED") {
        Ok(raw) => raw.parse()?,
        Err(_) => rand::random(),
    };
    let config = GameConfig::default().with_seed(seed);

    let game = QuizGame::new(
        config,
        Arc::new(StaticBank::default_trivia()),
        Arc::new(ConsoleIo::new()),
    );

    // Every terminal state, including nobody joining, exits successfully.
    match game.run().await? {
        GameOutcome::Completed(board) => {
            info!(winners = ?board.winner_names(), "game complete");
        }
        GameOutcome::NoPlayers => {
            info!("game canceled: empty roster");
        }
    }
    Ok(())
}
