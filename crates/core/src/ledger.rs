//! Score keeping and per-question hint accounting.

use std::collections::HashSet;

use rand::Rng;
use thiserror::Error;

use crate::model::{Hint, HintKind};

/// Hints a single question may reveal.
pub const MAX_HINTS_PER_QUESTION: usize = 3;
/// Points awarded for a correct answer.
pub const CORRECT_POINTS: u32 = 2;
/// Points deducted for a wrong answer, a timeout, or a hint.
pub const PENALTY_POINTS: u32 = 1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HintDenied {
    #[error("You need at least 1 point to get a hint.")]
    InsufficientScore,
    #[error("You've used all available hints for this question.")]
    LimitReached,
    #[error("No more hints available for this question.")]
    NoneAvailable,
}

/// Running score plus the hint kinds revealed for the current question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLedger {
    score: u32,
    revealed: Vec<HintKind>,
}

impl ScoreLedger {
    #[must_use]
    pub fn new(initial: u32) -> Self {
        Self {
            score: initial,
            revealed: Vec::new(),
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn revealed(&self) -> &[HintKind] {
        &self.revealed
    }

    /// Start over at `initial` with no hints revealed.
    pub fn reset(&mut self, initial: u32) {
        self.score = initial;
        self.revealed.clear();
    }

    /// Forget the current question's hints.
    pub fn clear_hints(&mut self) {
        self.revealed.clear();
    }

    pub fn award_correct(&mut self) -> u32 {
        self.score = self.score.saturating_add(CORRECT_POINTS);
        self.score
    }

    pub fn penalize_incorrect(&mut self) -> u32 {
        self.deduct()
    }

    pub fn penalize_timeout(&mut self) -> u32 {
        self.deduct()
    }

    /// Reveal one hint chosen uniformly among the kinds not yet shown, for one point.
    ///
    /// # Errors
    ///
    /// Returns `HintDenied` when the score is exhausted, the per-question cap is
    /// reached, or every candidate kind was already revealed. The ledger is left
    /// untouched on denial.
    pub fn request_hint<R: Rng + ?Sized>(
        &mut self,
        candidates: Vec<Hint>,
        rng: &mut R,
    ) -> Result<Hint, HintDenied> {
        if self.score == 0 {
            return Err(HintDenied::InsufficientScore);
        }
        if self.revealed.len() >= MAX_HINTS_PER_QUESTION {
            return Err(HintDenied::LimitReached);
        }

        let mut seen = HashSet::new();
        let mut available: Vec<Hint> = candidates
            .into_iter()
            .filter(|hint| !self.revealed.contains(&hint.kind) && seen.insert(hint.kind))
            .collect();
        if available.is_empty() {
            return Err(HintDenied::NoneAvailable);
        }

        let hint = available.swap_remove(rng.random_range(0..available.len()));
        self.revealed.push(hint.kind);
        self.deduct();
        Ok(hint)
    }

    fn deduct(&mut self) -> u32 {
        self.score = self.score.saturating_sub(PENALTY_POINTS);
        self.score
    }
}

/// Best score reachable with `question_count` questions and a baseline of `initial`.
#[must_use]
pub fn max_possible_score(initial: u32, question_count: u32) -> u32 {
    initial.saturating_add(CORRECT_POINTS.saturating_mul(question_count))
}

/// `round(100 * score / max)`, halves rounding up.
#[must_use]
pub fn percentage(score: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    let score = u64::from(score);
    let max = u64::from(max);
    let rounded = (200 * score + max) / (2 * max);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn hints() -> Vec<Hint> {
        vec![
            Hint::new(HintKind::Region, "Region: Europe"),
            Hint::new(HintKind::Population, "Population: 1,000"),
            Hint::new(HintKind::Area, "Area: 10 km²"),
            Hint::new(HintKind::Language, "Language: French"),
        ]
    }

    #[test]
    fn scenario_six_right_four_wrong() {
        let mut ledger = ScoreLedger::new(10);
        for _ in 0..6 {
            ledger.award_correct();
        }
        for _ in 0..4 {
            ledger.penalize_incorrect();
        }
        let max = max_possible_score(10, 10);

        assert_eq!(ledger.score(), 18);
        assert_eq!(max, 30);
        assert_eq!(percentage(ledger.score(), max), 60);
    }

    #[test]
    fn percentage_rounds_like_the_scoreboard() {
        assert_eq!(percentage(22, 30), 73);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 30), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn penalties_floor_at_zero() {
        let mut ledger = ScoreLedger::new(1);
        assert_eq!(ledger.penalize_timeout(), 0);
        assert_eq!(ledger.penalize_incorrect(), 0);
    }

    #[test]
    fn fourth_hint_hits_the_limit() {
        let mut ledger = ScoreLedger::new(10);
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..3 {
            ledger.request_hint(hints(), &mut rng).unwrap();
        }
        assert_eq!(ledger.score(), 7);

        let denied = ledger.request_hint(hints(), &mut rng).unwrap_err();
        assert_eq!(denied, HintDenied::LimitReached);
        assert_eq!(ledger.score(), 7);
    }

    #[test]
    fn zero_score_denies_hints() {
        let mut ledger = ScoreLedger::new(0);
        let mut rng = StdRng::seed_from_u64(9);
        let denied = ledger.request_hint(hints(), &mut rng).unwrap_err();
        assert_eq!(denied, HintDenied::InsufficientScore);
        assert!(ledger.revealed().is_empty());
    }

    #[test]
    fn exhausted_kinds_deny() {
        let mut ledger = ScoreLedger::new(10);
        let mut rng = StdRng::seed_from_u64(2);
        let only_one = vec![Hint::new(HintKind::Area, "Area: 1 km²")];

        ledger.request_hint(only_one.clone(), &mut rng).unwrap();
        let denied = ledger.request_hint(only_one, &mut rng).unwrap_err();
        assert_eq!(denied, HintDenied::NoneAvailable);
        assert_eq!(ledger.score(), 9);
    }

    #[test]
    fn clear_hints_allows_fresh_reveals() {
        let mut ledger = ScoreLedger::new(10);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..3 {
            ledger.request_hint(hints(), &mut rng).unwrap();
        }
        ledger.clear_hints();
        assert!(ledger.request_hint(hints(), &mut rng).is_ok());
    }

    #[test]
    fn repeated_kinds_count_once() {
        let candidates = vec![
            Hint::new(HintKind::Area, "Area: first"),
            Hint::new(HintKind::Region, "Region: Asia"),
            Hint::new(HintKind::Area, "Area: second"),
        ];
        for seed in 0..32 {
            let mut ledger = ScoreLedger::new(10);
            let mut rng = StdRng::seed_from_u64(seed);
            let first = ledger.request_hint(candidates.clone(), &mut rng).unwrap();
            let second = ledger.request_hint(candidates.clone(), &mut rng).unwrap();

            assert_ne!(first.kind, second.kind);
            assert_ne!(first.text, "Area: second");
            assert_ne!(second.text, "Area: second");
            assert_eq!(
                ledger.request_hint(candidates.clone(), &mut rng),
                Err(HintDenied::NoneAvailable)
            );
        }
    }

    proptest! {
        #[test]
        fn hints_never_repeat_within_a_question(initial in 0_u32..6, seed in any::<u64>()) {
            let mut ledger = ScoreLedger::new(initial);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut kinds = Vec::new();

            for _ in 0..6 {
                let before = ledger.score();
                match ledger.request_hint(hints(), &mut rng) {
                    Ok(hint) => {
                        prop_assert!(before > 0);
                        prop_assert!(!kinds.contains(&hint.kind));
                        kinds.push(hint.kind);
                    }
                    Err(_) => prop_assert_eq!(ledger.score(), before),
                }
            }
            prop_assert!(kinds.len() <= MAX_HINTS_PER_QUESTION);
        }

        #[test]
        fn score_stays_non_negative(ops in proptest::collection::vec(0_u8..3, 0..64), initial in 0_u32..20) {
            let mut ledger = ScoreLedger::new(initial);
            for op in ops {
                let before = ledger.score();
                match op {
                    0 => { ledger.award_correct(); }
                    1 => { ledger.penalize_incorrect(); }
                    _ => { ledger.penalize_timeout(); }
                }
                if op != 0 && before == 0 {
                    prop_assert_eq!(ledger.score(), 0);
                }
            }
        }
    }
}
