//! Questions, option labels, and the question bank.
//!
//! A question is an ordered set of labeled options with exactly one correct
//! label. The engine never interprets question or option text — it only
//! passes text through to the I/O channel and compares labels.
//!
//! The bank is an external collaborator from the engine's point of view:
//! the driver only calls `len` (which fixes the round count) and `get`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single option label, stored uppercase.
///
/// Labels are drawn from a fixed small alphabet (`A`..`D` in the default
/// bank) and are unique within a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionLabel(pub char);

impl OptionLabel {
    /// Create a label, normalizing to uppercase.
    #[must_use]
    pub fn new(c: char) -> Self {
        Self(c.to_ascii_uppercase())
    }

    /// Parse a label from raw player input.
    ///
    /// Accepts exactly one character (after trimming), case-insensitively.
    /// Returns `None` for anything else; membership in a particular
    /// question's option set is checked separately.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Self::new(c)),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A quiz question: ordered labeled options plus one correct label.
///
/// Immutable once constructed. The constructor enforces the structural
/// invariants (unique labels, correct label present, at least two options).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    /// Zero-based round index this question is asked in.
    pub index: usize,
    /// Question text, opaque to the engine.
    pub text: String,
    /// Ordered (label, option text) pairs.
    options: Vec<(OptionLabel, String)>,
    /// The correct label. Always a key of `options`.
    correct: OptionLabel,
}

impl Question {
    /// Create a new question.
    ///
    /// Labels are normalized to uppercase.
    pub fn new(
        index: usize,
        text: impl Into<String>,
        options: Vec<(char, String)>,
        correct: char,
    ) -> Self {
        let options: Vec<(OptionLabel, String)> = options
            .into_iter()
            .map(|(label, text)| (OptionLabel::new(label), text))
            .collect();
        let correct = OptionLabel::new(correct);

        assert!(options.len() >= 2, "A question needs at least 2 options");
        for (i, (label, _)) in options.iter().enumerate() {
            assert!(
                !options[..i].iter().any(|(other, _)| other == label),
                "Duplicate option label {label}"
            );
        }
        assert!(
            options.iter().any(|(label, _)| *label == correct),
            "Correct label {correct} is not among the options"
        );

        Self {
            index,
            text: text.into(),
            options,
            correct,
        }
    }

    /// The correct label.
    #[must_use]
    pub fn correct(&self) -> OptionLabel {
        self.correct
    }

    /// Ordered (label, option text) pairs.
    #[must_use]
    pub fn options(&self) -> &[(OptionLabel, String)] {
        &self.options
    }

    /// All labels, in option order.
    pub fn labels(&self) -> impl Iterator<Item = OptionLabel> + '_ {
        self.options.iter().map(|(label, _)| *label)
    }

    /// Check whether a label is part of this question's option set.
    #[must_use]
    pub fn has_label(&self, label: OptionLabel) -> bool {
        self.options.iter().any(|(l, _)| *l == label)
    }

    /// Option text for a label, if present.
    #[must_use]
    pub fn option_text(&self, label: OptionLabel) -> Option<&str> {
        self.options
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, text)| text.as_str())
    }

    /// All incorrect labels, in option order.
    ///
    /// Most questions have 3; narrowing help needs at least 1.
    #[must_use]
    pub fn incorrect_labels(&self) -> SmallVec<[OptionLabel; 4]> {
        self.options
            .iter()
            .map(|(label, _)| *label)
            .filter(|label| *label != self.correct)
            .collect()
    }
}

/// Source of questions for a game.
///
/// The number of questions fixes the number of rounds.
pub trait QuestionBank: Send + Sync {
    /// Number of questions (and therefore rounds).
    fn len(&self) -> usize;

    /// Get the question for a round. Panics if `round >= len()`.
    fn get(&self, round: usize) -> &Question;

    /// True when the bank holds no questions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory question bank.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StaticBank {
    questions: Vec<Question>,
}

impl StaticBank {
    /// Create a bank from a fixed list of questions.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The reference three-question trivia bank (4 options each).
    #[must_use]
    pub fn default_trivia() -> Self {
        let q = |index, text: &str, opts: [(char, &str); 4], correct| {
            Question::new(
                index,
                text,
                opts.iter().map(|&(l, t)| (l, t.to_string())).collect(),
                correct,
            )
        };
        Self::new(vec![
            q(
                0,
                "What is the capital of France?",
                [('A', "London"), ('B', "Paris"), ('C', "Berlin"), ('D', "Madrid")],
                'B',
            ),
            q(
                1,
                "Which is the Red Planet?",
                [('A', "Venus"), ('B', "Earth"), ('C', "Mars"), ('D', "Jupiter")],
                'C',
            ),
            q(
                2,
                "Who wrote Romeo and Juliet?",
                [('A', "Shakespeare"), ('B', "Hemingway"), ('C', "Tolkien"), ('D', "Rowling")],
                'A',
            ),
        ])
    }
}

impl QuestionBank for StaticBank {
    fn len(&self) -> usize {
        self.questions.len()
    }

    fn get(&self, round: usize) -> &Question {
        &self.questions[round]
    }
}
