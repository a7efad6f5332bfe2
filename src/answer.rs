//! Answer validation, the timed answer race, and scoring.
//!
//! The timed read is one-shot by design: a malformed answer under deadline
//! is simply recorded as the no-answer sentinel, while the untimed lifeline
//! phase before it re-prompts indefinitely. The deadline race uses a
//! cancellable wait — when the countdown wins, the pending prompt future is
//! dropped, so input arriving late is never applied to the round.

use std::time::Duration;

use tracing::{debug, warn};

use crate::core::{OptionLabel, PlayerId, PlayerState, Question};
use crate::io::IoChannel;
use crate::lifelines::HiddenOptions;

/// Validate one line of raw input against a question.
///
/// Accepted iff the trimmed input is exactly one character that
/// case-insensitively matches a label in the option set and is not hidden
/// by a lifeline this round. Everything else is the no-answer sentinel.
#[must_use]
pub fn validate_answer(
    line: &str,
    question: &Question,
    hidden: &HiddenOptions,
) -> Option<OptionLabel> {
    let label = OptionLabel::parse(line)?;
    (question.has_label(label) && !hidden.is_hidden(label)).then_some(label)
}

/// Apply one player's round outcome to their own score.
///
/// A case-normalized exact match adds `points`; the sentinel and any
/// mismatch leave the score unchanged. Returns whether the answer was
/// correct.
pub fn evaluate(state: &mut PlayerState, question: &Question, points: i64) -> bool {
    match state.answer {
        Some(label) if label == question.correct() => {
            state.score += points;
            true
        }
        _ => false,
    }
}

/// Obtain one validated answer within `deadline`, racing the prompt
/// against a countdown.
///
/// Returns `None` when the deadline elapses first (the pending read is
/// cancelled, discarding any later input), when the reply is malformed, or
/// when the reply names a hidden label. Channel failures are absorbed as
/// non-answers so the player's task keeps participating in the round.
pub async fn collect_timed_answer(
    io: &dyn IoChannel,
    seat: PlayerId,
    name: &str,
    question: &Question,
    hidden: &HiddenOptions,
    deadline: Duration,
) -> Option<OptionLabel> {
    let visible: Vec<String> = question
        .labels()
        .filter(|label| !hidden.is_hidden(*label))
        .map(|label| label.to_string())
        .collect();
    let text = format!("[{name}] Your answer ({}): ", visible.join("/"));

    let line = match tokio::time::timeout(deadline, io.prompt(seat, &text)).await {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => {
            warn!(%seat, error = %e, "prompt failed during timed read");
            return None;
        }
        Err(_) => {
            debug!(%seat, "answer deadline elapsed");
            let _ = io
                .announce(&format!("⏰ [{name}] Time's up — no answer recorded."))
                .await;
            return None;
        }
    };

    match validate_answer(&line, question, hidden) {
        Some(label) => Some(label),
        None => {
            let _ = io
                .announce(&format!("[{name}] '{}' is not a valid choice.", line.trim()))
                .await;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{Reply, ScriptedIo};
    use crate::lifelines::{narrow_options, HiddenOptions};
    use crate::core::GameRng;
    use proptest::prelude::*;

    fn question() -> Question {
        Question::new(
            0,
            "What is the capital of France?",
            vec![
                ('A', "London".to_string()),
                ('B', "Paris".to_string()),
                ('C', "Berlin".to_string()),
                ('D', "Madrid".to_string()),
            ],
            'B',
        )
    }

    #[test]
    fn test_validate_accepts_case_insensitively() {
        let q = question();
        let hidden = HiddenOptions::new();
        assert_eq!(validate_answer("b", &q, &hidden), Some(OptionLabel('B')));
        assert_eq!(validate_answer(" D ", &q, &hidden), Some(OptionLabel('D')));
    }

    #[test]
    fn test_validate_rejects_malformed_input() {
        let q = question();
        let hidden = HiddenOptions::new();
        assert_eq!(validate_answer("", &q, &hidden), None);
        assert_eq!(validate_answer("AB", &q, &hidden), None);
        assert_eq!(validate_answer("E", &q, &hidden), None);
        assert_eq!(validate_answer("yes", &q, &hidden), None);
    }

    #[test]
    fn test_validate_rejects_hidden_labels() {
        let q = question();
        let mut hidden = HiddenOptions::new();
        hidden.hide(OptionLabel('A'));
        assert_eq!(validate_answer("A", &q, &hidden), None);
        assert_eq!(validate_answer("B", &q, &hidden), Some(OptionLabel('B')));
    }

    #[test]
    fn test_evaluate_scores_exact_match_only() {
        let q = question();

        let mut state = PlayerState::default();
        state.answer = Some(OptionLabel('B'));
        assert!(evaluate(&mut state, &q, 10));
        assert_eq!(state.score, 10);

        state.answer = Some(OptionLabel('C'));
        assert!(!evaluate(&mut state, &q, 10));
        assert_eq!(state.score, 10);

        state.answer = None;
        assert!(!evaluate(&mut state, &q, 10));
        assert_eq!(state.score, 10);
    }

    #[tokio::test]
    async fn test_collect_returns_validated_label() {
        let q = question();
        let hidden = HiddenOptions::new();
        let io = ScriptedIo::lines(vec![vec!["b"]]);

        let answer = collect_timed_answer(
            &io,
            PlayerId::new(0),
            "Ada",
            &q,
            &hidden,
            Duration::from_secs(10),
        )
        .await;
        assert_eq!(answer, Some(OptionLabel('B')));
    }

    #[tokio::test]
    async fn test_collect_does_not_retry_malformed_input() {
        let q = question();
        let hidden = HiddenOptions::new();
        // A second, valid line is scripted but must never be read.
        let io = ScriptedIo::lines(vec![vec!["nope", "B"]]);

        let answer = collect_timed_answer(
            &io,
            PlayerId::new(0),
            "Ada",
            &q,
            &hidden,
            Duration::from_secs(10),
        )
        .await;
        assert_eq!(answer, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_times_out_to_no_answer() {
        let q = question();
        let hidden = HiddenOptions::new();
        let io = ScriptedIo::new(vec![vec![Reply::Timeout]]);

        let answer = collect_timed_answer(
            &io,
            PlayerId::new(0),
            "Ada",
            &q,
            &hidden,
            Duration::from_secs(10),
        )
        .await;
        assert_eq!(answer, None);
        assert!(io.transcript().iter().any(|line| line.contains("Time's up")));
    }

    #[tokio::test]
    async fn test_collect_rejects_narrowed_label() {
        let q = question();
        let mut player = PlayerState::default();
        let mut hidden = HiddenOptions::new();
        let mut rng = GameRng::new(4);
        narrow_options(&q, &mut player, &mut hidden, &mut rng);

        let hidden_label = hidden.labels()[0];
        let io = ScriptedIo::new(vec![vec![Reply::Line(hidden_label.to_string())]]);

        let answer = collect_timed_answer(
            &io,
            PlayerId::new(0),
            "Ada",
            &q,
            &hidden,
            Duration::from_secs(10),
        )
        .await;
        assert_eq!(answer, None);
    }

    proptest! {
        #[test]
        fn prop_any_visible_label_is_accepted(label_idx in 0usize..4, uppercase in any::<bool>()) {
            let q = question();
            let hidden = HiddenOptions::new();
            let label = q.options()[label_idx].0;
            let raw = if uppercase {
                label.0.to_ascii_uppercase().to_string()
            } else {
                label.0.to_ascii_lowercase().to_string()
            };
            prop_assert_eq!(validate_answer(&raw, &q, &hidden), Some(label));
        }

        #[test]
        fn prop_multi_char_input_is_rejected(input in "[a-zA-Z]{2,8}") {
            let q = question();
            let hidden = HiddenOptions::new();
            prop_assert_eq!(validate_answer(&input, &q, &hidden), None);
        }
    }
}
