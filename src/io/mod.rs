//! The per-player I/O channel and its console implementation.
//!
//! All prompt/response traffic in a game funnels through one shared
//! channel. Implementations must serialize each exchange: with several
//! player tasks prompting concurrently, interleaved half-prompts are
//! meaningless to whoever is typing.
//!
//! `prompt` futures must be safe to drop: the timed answer collector
//! cancels a pending read when the deadline fires.

pub mod scripted;

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::PlayerId;

pub use scripted::{Reply, ScriptedIo};

/// Bidirectional text channel shared by every player in a game.
///
/// `seat` identifies who the exchange belongs to; implementations may use
/// it for routing (the scripted channel does) or ignore it (the console
/// shows the player name embedded in the prompt text).
#[async_trait]
pub trait IoChannel: Send + Sync {
    /// One serialized prompt/response exchange.
    ///
    /// A closed input stream yields an empty line rather than an error, so
    /// the game can absorb it as a non-answer.
    async fn prompt(&self, seat: PlayerId, text: &str) -> io::Result<String>;

    /// Write one line visible to everyone.
    async fn announce(&self, text: &str) -> io::Result<()>;
}

struct ConsoleInner {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

/// Real console channel over stdin/stdout.
///
/// A single lock is held for the duration of one prompt/response exchange,
/// so concurrent player tasks take turns at the terminal.
pub struct ConsoleIo {
    inner: Mutex<ConsoleInner>,
}

impl ConsoleIo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ConsoleInner {
                lines: BufReader::new(tokio::io::stdin()).lines(),
                stdout: tokio::io::stdout(),
            }),
        }
    }
}

impl Default for ConsoleIo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IoChannel for ConsoleIo {
    async fn prompt(&self, seat: PlayerId, text: &str) -> io::Result<String> {
        let mut inner = self.inner.lock().await;
        inner.stdout.write_all(text.as_bytes()).await?;
        inner.stdout.flush().await?;
        match inner.lines.next_line().await? {
            Some(line) => Ok(line),
            None => {
                // EOF: hand back an empty line, the game treats it as a
                // non-answer instead of failing the player's task.
                debug!(%seat, "stdin closed during prompt");
                Ok(String::new())
            }
        }
    }

    async fn announce(&self, text: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.stdout.write_all(text.as_bytes()).await?;
        inner.stdout.write_all(b"\n").await?;
        inner.stdout.flush().await?;
        Ok(())
    }
}
