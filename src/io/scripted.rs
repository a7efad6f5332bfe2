//! Scripted I/O channel for tests and unattended play.
//!
//! Each seat gets a queue of canned replies. A `Timeout` reply never
//! resolves, which is how tests exercise the answer deadline: the
//! collector's timeout fires and drops the pending prompt future.

use std::collections::VecDeque;
use std::io;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::IoChannel;
use crate::core::PlayerId;

/// One scripted reaction to a prompt.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Respond with this line.
    Line(String),
    /// Never respond; the caller's deadline must rescue it.
    Timeout,
}

impl Reply {
    /// Convenience constructor for a line reply.
    #[must_use]
    pub fn line(s: &str) -> Self {
        Self::Line(s.to_string())
    }
}

/// Deterministic channel that replays per-seat scripts.
///
/// An exhausted script yields empty lines, which the game absorbs as
/// non-answers; a missing scripted line therefore shows up as a wrong
/// answer in assertions rather than a hung test.
pub struct ScriptedIo {
    scripts: Vec<Mutex<VecDeque<Reply>>>,
    transcript: StdMutex<Vec<String>>,
}

impl ScriptedIo {
    /// Create a channel with one reply queue per seat.
    #[must_use]
    pub fn new(scripts: Vec<Vec<Reply>>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|s| Mutex::new(s.into_iter().collect()))
                .collect(),
            transcript: StdMutex::new(Vec::new()),
        }
    }

    /// Create a channel from plain line scripts.
    #[must_use]
    pub fn lines(scripts: Vec<Vec<&str>>) -> Self {
        Self::new(
            scripts
                .into_iter()
                .map(|s| s.into_iter().map(Reply::line).collect())
                .collect(),
        )
    }

    /// Everything announced so far, in order.
    #[must_use]
    pub fn transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .clone()
    }
}

#[async_trait]
impl IoChannel for ScriptedIo {
    async fn prompt(&self, seat: PlayerId, _text: &str) -> io::Result<String> {
        let reply = {
            let mut queue = self.scripts[seat.index()].lock().await;
            queue.pop_front()
        };
        match reply {
            Some(Reply::Line(line)) => Ok(line),
            Some(Reply::Timeout) => std::future::pending().await,
            None => Ok(String::new()),
        }
    }

    async fn announce(&self, text: &str) -> io::Result<()> {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_are_per_seat_and_ordered() {
        let io = ScriptedIo::lines(vec![vec!["Ada", "yes"], vec!["no"]]);

        assert_eq!(io.prompt(PlayerId::new(0), "name?").await.unwrap(), "Ada");
        assert_eq!(io.prompt(PlayerId::new(1), "join?").await.unwrap(), "no");
        assert_eq!(io.prompt(PlayerId::new(0), "join?").await.unwrap(), "yes");
    }

    #[tokio::test]
    async fn test_exhausted_script_yields_empty_lines() {
        let io = ScriptedIo::lines(vec![vec![]]);
        assert_eq!(io.prompt(PlayerId::new(0), "?").await.unwrap(), "");
        assert_eq!(io.prompt(PlayerId::new(0), "?").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_transcript_records_announcements() {
        let io = ScriptedIo::lines(vec![]);
        io.announce("Round 1").await.unwrap();
        io.announce("Round 2").await.unwrap();
        assert_eq!(io.transcript(), vec!["Round 1", "Round 2"]);
    }
}
