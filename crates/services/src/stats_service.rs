use std::sync::Arc;

use geoquiz_core::model::{QuizStats, VariantId, VariantStats};
use storage::repository::{StatsRepository, StorageError};

use crate::error::StatsError;

/// Folds completed sessions into the persisted per-variant watermarks.
#[derive(Clone)]
pub struct StatsService {
    repo: Arc<dyn StatsRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(repo: Arc<dyn StatsRepository>) -> Self {
        Self { repo }
    }

    /// Current stats with a zeroed entry for every known variant.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the store is unreachable.
    pub async fn load(&self) -> Result<QuizStats, StatsError> {
        Ok(self.load_stored().await?.with_known_variants())
    }

    /// Record one completed session and persist the whole mapping.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if reading or writing the store fails.
    pub async fn record_completion(
        &self,
        variant: VariantId,
        final_score: u32,
        percentage: u32,
    ) -> Result<VariantStats, StatsError> {
        let mut stats = self.load_stored().await?;
        let updated = stats.record_completion(variant, final_score, percentage);
        self.repo.save_stats(&stats).await?;
        tracing::info!(
            %variant,
            final_score,
            percentage,
            best_score = updated.best_score,
            games_played = updated.games_played,
            "recorded completion"
        );
        Ok(updated)
    }

    /// Overwrite every variant with a zeroed record.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` if the store write fails.
    pub async fn reset(&self) -> Result<QuizStats, StatsError> {
        let stats = QuizStats::zeroed();
        self.repo.save_stats(&stats).await?;
        tracing::info!("stats reset");
        Ok(stats)
    }

    async fn load_stored(&self) -> Result<QuizStats, StatsError> {
        match self.repo.get_stats().await {
            Ok(stats) => Ok(stats.unwrap_or_default()),
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(%reason, "stored stats unreadable, starting fresh");
                Ok(QuizStats::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}
