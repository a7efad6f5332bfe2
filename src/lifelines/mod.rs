//! One-shot per-player assists: narrowing, expert suggestion, audience poll.
//!
//! Each lifeline may be consumed at most once per game per player. All
//! three read and mutate only the calling player's own record plus the
//! round's transient hidden-option set; no lifeline touches scores or any
//! other player's state. Outcomes are driven by the player's own seeded
//! [`GameRng`] stream so tests can pin them down.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{GameRng, OptionLabel, PlayerState, Question};

/// Probability that the expert suggests the correct label.
pub const SUGGEST_CORRECT_PROBABILITY: f64 = 0.8;

/// Audience poll: random base weight per label, drawn from this range.
const POLL_BASE_WEIGHT: std::ops::RangeInclusive<u8> = 5..=15;
/// Audience poll: extra weight piled onto the correct label. Large enough
/// that the correct label always polls strictly highest.
const POLL_CORRECT_BONUS: u32 = 60;

/// The three lifeline kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifelineKind {
    /// Hide two incorrect options for the rest of the round.
    Narrow,
    /// Ask the simulated expert for a suggested label.
    Suggest,
    /// Run the simulated audience poll.
    Poll,
}

impl std::fmt::Display for LifelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifelineKind::Narrow => write!(f, "50:50"),
            LifelineKind::Suggest => write!(f, "ask the expert"),
            LifelineKind::Poll => write!(f, "audience poll"),
        }
    }
}

/// Labels hidden from a player for the remainder of the current round.
///
/// Recreated empty at the start of every round; only the narrowing
/// lifeline ever adds to it, and it can hide at most two labels.
#[derive(Clone, Debug, Default)]
pub struct HiddenOptions {
    labels: SmallVec<[OptionLabel; 2]>,
}

impl HiddenOptions {
    /// Fresh, empty set for a new round.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a label is hidden.
    #[must_use]
    pub fn is_hidden(&self, label: OptionLabel) -> bool {
        self.labels.contains(&label)
    }

    /// Hide a label for the rest of the round.
    pub fn hide(&mut self, label: OptionLabel) {
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
    }

    /// Currently hidden labels.
    #[must_use]
    pub fn labels(&self) -> &[OptionLabel] {
        &self.labels
    }

    /// True when nothing is hidden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Result of invoking a lifeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifelineOutcome {
    /// The lifeline was consumed earlier; nothing changed.
    AlreadyUsed(LifelineKind),
    /// Labels hidden by the narrowing lifeline (two, or one if the
    /// question only had one incorrect option).
    Narrowed(SmallVec<[OptionLabel; 2]>),
    /// The expert's suggested label.
    Suggestion(OptionLabel),
    /// Poll percentages per label, in option order. Sums to exactly 100.
    Poll(Vec<(OptionLabel, u8)>),
}

/// Narrowing help: hide two pseudo-random incorrect labels.
///
/// Degrades to hiding a single label when the question has only one
/// incorrect option. Never hides the correct label. Second and later uses
/// are no-ops reporting [`LifelineOutcome::AlreadyUsed`].
pub fn narrow_options(
    question: &Question,
    player: &mut PlayerState,
    hidden: &mut HiddenOptions,
    rng: &mut GameRng,
) -> LifelineOutcome {
    if !player.lifelines.consume(LifelineKind::Narrow) {
        return LifelineOutcome::AlreadyUsed(LifelineKind::Narrow);
    }

    let mut incorrect = question.incorrect_labels();
    rng.shuffle(&mut incorrect);

    let picked: SmallVec<[OptionLabel; 2]> =
        incorrect.into_iter().take(2).collect();
    for label in &picked {
        hidden.hide(*label);
    }
    LifelineOutcome::Narrowed(picked)
}

/// Expert suggestion: the correct label with high probability, otherwise a
/// uniformly random label from the full option set.
///
/// Mutates nothing but the one-shot flag.
pub fn suggest_answer(
    question: &Question,
    player: &mut PlayerState,
    rng: &mut GameRng,
) -> LifelineOutcome {
    if !player.lifelines.consume(LifelineKind::Suggest) {
        return LifelineOutcome::AlreadyUsed(LifelineKind::Suggest);
    }

    let suggestion = if rng.gen_bool(SUGGEST_CORRECT_PROBABILITY) {
        question.correct()
    } else {
        let labels: Vec<OptionLabel> = question.labels().collect();
        *rng.choose(&labels).expect("question has at least 2 options")
    };
    LifelineOutcome::Suggestion(suggestion)
}

/// Audience poll: synthetic percentages over all labels, summing to 100.
///
/// Every label gets a random base weight; the correct label gets a large
/// bonus on top, so it always polls strictly highest. Purely
/// informational: mutates nothing but the one-shot flag.
pub fn audience_poll(
    question: &Question,
    player: &mut PlayerState,
    rng: &mut GameRng,
) -> LifelineOutcome {
    if !player.lifelines.consume(LifelineKind::Poll) {
        return LifelineOutcome::AlreadyUsed(LifelineKind::Poll);
    }

    let mut weights: FxHashMap<OptionLabel, u32> = FxHashMap::default();
    for label in question.labels() {
        let mut weight = u32::from(rng.gen_range_u8(POLL_BASE_WEIGHT));
        if label == question.correct() {
            weight += POLL_CORRECT_BONUS;
        }
        weights.insert(label, weight);
    }
    let total: u32 = weights.values().sum();

    // Integer percentages in option order; the rounding remainder goes to
    // the correct label so the total is exactly 100.
    let mut percentages: Vec<(OptionLabel, u8)> = question
        .labels()
        .map(|label| (label, (weights[&label] * 100 / total) as u8))
        .collect();
    let assigned: u32 = percentages.iter().map(|(_, p)| u32::from(*p)).sum();
    let remainder = (100 - assigned) as u8;
    for (label, pct) in &mut percentages {
        if *label == question.correct() {
            *pct += remainder;
        }
    }
    LifelineOutcome::Poll(percentages)
}
