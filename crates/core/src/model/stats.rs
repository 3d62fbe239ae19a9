use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::VariantId;

/// Per-variant watermark record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStats {
    pub best_score: u32,
    #[serde(default)]
    pub best_percentage: u32,
    pub games_played: u32,
}

impl VariantStats {
    /// Fold one completed session into the record.
    ///
    /// `best_score` and `best_percentage` only move upward.
    pub fn record(&mut self, score: u32, percentage: u32) {
        self.games_played = self.games_played.saturating_add(1);
        self.best_score = self.best_score.max(score);
        self.best_percentage = self.best_percentage.max(percentage);
    }
}

/// Aggregate stats for every variant, persisted as one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuizStats {
    variants: BTreeMap<VariantId, VariantStats>,
}

// Older stores carry entries for quiz modes that no longer exist ("size",
// "population"); those are dropped instead of failing the whole load.
impl<'de> Deserialize<'de> for QuizStats {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, VariantStats>::deserialize(deserializer)?;
        let variants = raw
            .into_iter()
            .filter_map(|(key, stats)| key.parse::<VariantId>().ok().map(|id| (id, stats)))
            .collect();
        Ok(Self { variants })
    }
}

impl QuizStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed records for every known variant.
    #[must_use]
    pub fn zeroed() -> Self {
        let mut stats = Self::new();
        for variant in VariantId::ALL {
            stats.variants.insert(variant, VariantStats::default());
        }
        stats
    }

    #[must_use]
    pub fn get(&self, variant: VariantId) -> VariantStats {
        self.variants.get(&variant).copied().unwrap_or_default()
    }

    /// Record a completion, creating a zeroed entry for unseen variants.
    pub fn record_completion(&mut self, variant: VariantId, score: u32, percentage: u32) -> VariantStats {
        let entry = self.variants.entry(variant).or_default();
        entry.record(score, percentage);
        *entry
    }

    /// Fill in zeroed entries for variants that have never been played.
    #[must_use]
    pub fn with_known_variants(mut self) -> Self {
        for variant in VariantId::ALL {
            self.variants.entry(variant).or_default();
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantId, VariantStats)> + '_ {
        self.variants.iter().map(|(id, stats)| (*id, *stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermarks_only_rise() {
        let mut stats = QuizStats::new();
        stats.record_completion(VariantId::Flag, 18, 60);
        stats.record_completion(VariantId::Flag, 22, 73);
        stats.record_completion(VariantId::Flag, 5, 17);

        let flag = stats.get(VariantId::Flag);
        assert_eq!(flag.best_score, 22);
        assert_eq!(flag.best_percentage, 73);
        assert_eq!(flag.games_played, 3);
        assert_eq!(stats.get(VariantId::Capital), VariantStats::default());
    }

    #[test]
    fn json_layout_is_keyed_by_variant() {
        let mut stats = QuizStats::new();
        stats.record_completion(VariantId::Capital, 12, 40);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"capital": {"bestScore": 12, "bestPercentage": 40, "gamesPlayed": 1}})
        );
    }

    #[test]
    fn unknown_modes_are_skipped() {
        let stats: QuizStats = serde_json::from_str(
            r#"{"flag": {"bestScore": 3, "gamesPlayed": 1}, "size": {"bestScore": 0, "gamesPlayed": 0}}"#,
        )
        .unwrap();
        assert_eq!(stats.iter().count(), 1);
        assert_eq!(stats.get(VariantId::Flag).best_score, 3);
    }

    #[test]
    fn legacy_entries_without_percentage_load() {
        let stats: QuizStats =
            serde_json::from_str(r#"{"flag": {"bestScore": 9, "gamesPlayed": 4}}"#).unwrap();
        assert_eq!(stats.get(VariantId::Flag).best_percentage, 0);
        assert_eq!(stats.get(VariantId::Flag).games_played, 4);
    }
}
