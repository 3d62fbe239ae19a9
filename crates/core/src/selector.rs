//! Non-repeating selection of a round's correct answer and distractors.

use rand::Rng;
use rand::seq::{SliceRandom, index};
use std::collections::HashSet;

use crate::model::{CountryCode, CountryRecord};

/// Correct answer plus the shuffled option set it appears in.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub correct: CountryRecord,
    pub options: Vec<CountryRecord>,
    /// True when every candidate had been used and the answer was drawn from the whole pool.
    pub degraded: bool,
}

impl Round {
    /// Index of the correct answer inside `options`.
    #[must_use]
    pub fn correct_position(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| option.id() == self.correct.id())
    }
}

/// Tracks which candidates already served as a correct answer this session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedCandidates {
    ids: HashSet<CountryCode>,
}

impl UsedCandidates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &CountryCode) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    fn insert(&mut self, id: CountryCode) {
        self.ids.insert(id);
    }
}

/// Pick a fresh correct answer from `pool` plus `count - 1` distractors.
///
/// The used set is cleared once it reaches `pool.len() - count`, so selection
/// never starves. Returns `None` only for an empty pool.
pub fn select_round<R: Rng + ?Sized>(
    pool: &[CountryRecord],
    used: &mut UsedCandidates,
    count: usize,
    rng: &mut R,
) -> Option<Round> {
    if pool.is_empty() {
        return None;
    }

    if used.len() >= pool.len().saturating_sub(count) {
        used.clear();
    }

    let unused: Vec<usize> = (0..pool.len())
        .filter(|&idx| !used.contains(pool[idx].id()))
        .collect();

    let (correct_idx, degraded) = if unused.is_empty() {
        tracing::warn!(pool = pool.len(), "no unused candidates left, drawing from full pool");
        (rng.random_range(0..pool.len()), true)
    } else {
        (unused[rng.random_range(0..unused.len())], false)
    };

    let correct = pool[correct_idx].clone();
    used.insert(correct.id().clone());

    let others: Vec<&CountryRecord> = pool
        .iter()
        .enumerate()
        .filter(|(idx, record)| *idx != correct_idx && record.id() != correct.id())
        .map(|(_, record)| record)
        .collect();
    let wanted = count.saturating_sub(1).min(others.len());

    let mut options: Vec<CountryRecord> = Vec::with_capacity(wanted + 1);
    options.push(correct.clone());
    options.extend(
        index::sample(rng, others.len(), wanted)
            .into_iter()
            .map(|idx| others[idx].clone()),
    );
    options.shuffle(rng);

    Some(Round {
        correct,
        options,
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CountryDraft;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(size: usize) -> Vec<CountryRecord> {
        (0..size)
            .map(|i| {
                CountryDraft {
                    id: format!("C{}", (b'A' + u8::try_from(i % 26).unwrap()) as char)
                        + &"X".repeat(i / 26 + 1),
                    common_name: format!("Country {i}"),
                    capital: Some(format!("Capital {i}")),
                    population: 1,
                    ..CountryDraft::default()
                }
                .validate()
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn round_has_one_correct_and_three_distractors() {
        let pool = pool(10);
        let mut used = UsedCandidates::new();
        let mut rng = StdRng::seed_from_u64(7);

        let round = select_round(&pool, &mut used, 4, &mut rng).unwrap();

        assert_eq!(round.options.len(), 4);
        let hits = round
            .options
            .iter()
            .filter(|o| o.id() == round.correct.id())
            .count();
        assert_eq!(hits, 1);
        assert!(used.contains(round.correct.id()));
        assert!(!round.degraded);
    }

    #[test]
    fn small_pool_degrades_option_count() {
        let pool = pool(2);
        let mut used = UsedCandidates::new();
        let mut rng = StdRng::seed_from_u64(1);

        let round = select_round(&pool, &mut used, 4, &mut rng).unwrap();
        assert_eq!(round.options.len(), 2);
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let mut used = UsedCandidates::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_round(&[], &mut used, 4, &mut rng).is_none());
    }

    #[test]
    fn used_set_resets_before_starving() {
        let pool = pool(6);
        let mut used = UsedCandidates::new();
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let round = select_round(&pool, &mut used, 4, &mut rng).unwrap();
            assert!(!round.degraded);
            assert!(used.len() <= pool.len());
        }
    }

    #[test]
    fn correct_position_is_roughly_uniform() {
        let pool = pool(12);
        let mut used = UsedCandidates::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut hist = [0_u32; 4];

        for _ in 0..4_000 {
            let round = select_round(&pool, &mut used, 4, &mut rng).unwrap();
            hist[round.correct_position().unwrap()] += 1;
        }

        for bucket in hist {
            assert!((800..1_200).contains(&bucket), "skewed histogram: {hist:?}");
        }
    }

    proptest! {
        #[test]
        fn first_picks_never_repeat(size in 4_usize..40, count in 2_usize..5, seed in any::<u64>()) {
            let pool = pool(size);
            let mut used = UsedCandidates::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let fresh = size.saturating_sub(count).max(1);

            let mut seen = HashSet::new();
            for _ in 0..fresh {
                let round = select_round(&pool, &mut used, count, &mut rng).unwrap();
                prop_assert!(seen.insert(round.correct.id().clone()));
            }
        }

        #[test]
        fn options_never_duplicate(size in 4_usize..30, seed in any::<u64>()) {
            let pool = pool(size);
            let mut used = UsedCandidates::new();
            let mut rng = StdRng::seed_from_u64(seed);

            for _ in 0..10 {
                let round = select_round(&pool, &mut used, 4, &mut rng).unwrap();
                let ids: HashSet<_> = round.options.iter().map(|o| o.id().clone()).collect();
                prop_assert_eq!(ids.len(), round.options.len());
                prop_assert!(round.correct_position().is_some());
            }
        }
    }
}
