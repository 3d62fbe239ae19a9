use std::sync::Arc;

use geoquiz_core::model::{QuizSettings, QuizSettingsDraft, VariantId};
use storage::repository::{SettingsRepository, StorageError};

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings for `variant`, or defaults if missing.
    ///
    /// A stored value that no longer decodes or validates is logged and
    /// replaced by defaults for this load.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` if the store is unreachable.
    pub async fn load(&self, variant: VariantId) -> Result<QuizSettings, SettingsServiceError> {
        let stored = match self.repo.get_settings(variant).await {
            Ok(stored) => stored,
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(%variant, %reason, "stored settings unreadable, using defaults");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let Some(stored) = stored else {
            return Ok(QuizSettings::default());
        };
        match stored.validated() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::warn!(%variant, %err, "stored settings invalid, using defaults");
                Ok(QuizSettings::default())
            }
        }
    }

    /// Merge `draft` over `current`, validate, and persist.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation or persistence fails.
    pub async fn update(
        &self,
        variant: VariantId,
        current: &QuizSettings,
        draft: QuizSettingsDraft,
    ) -> Result<QuizSettings, SettingsServiceError> {
        let settings = draft.apply_to(current)?;
        self.save(variant, &settings).await?;
        Ok(settings)
    }

    /// Persist already validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` if the write fails.
    pub async fn save(
        &self,
        variant: VariantId,
        settings: &QuizSettings,
    ) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(variant, settings).await?;
        tracing::info!(
            %variant,
            region = %settings.region(),
            count = settings.question_count(),
            "settings saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquiz_core::model::{Difficulty, Region, RegionFilter};
    use storage::repository::InMemoryRepository;

    fn service() -> (SettingsService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (SettingsService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn missing_settings_load_defaults() {
        let (service, _) = service();
        let settings = service.load(VariantId::Flag).await.unwrap();
        assert_eq!(settings, QuizSettings::default());
    }

    #[tokio::test]
    async fn update_persists_and_reloads() {
        let (service, _) = service();
        let draft = QuizSettingsDraft {
            region: Some(RegionFilter::Only(Region::Africa)),
            question_count: Some(25),
            difficulty: Some(Difficulty::Hard),
        };

        let saved = service
            .update(VariantId::Capital, &QuizSettings::default(), draft)
            .await
            .unwrap();
        let loaded = service.load(VariantId::Capital).await.unwrap();

        assert_eq!(saved, loaded);
        assert_eq!(loaded.question_count(), 25);
        assert_eq!(service.load(VariantId::Flag).await.unwrap(), QuizSettings::default());
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_and_not_saved() {
        let (service, repo) = service();
        let draft = QuizSettingsDraft {
            question_count: Some(0),
            ..QuizSettingsDraft::new()
        };

        let err = service
            .update(VariantId::Flag, &QuizSettings::default(), draft)
            .await
            .unwrap_err();

        assert!(matches!(err, SettingsServiceError::Settings(_)));
        assert!(repo.get_raw("flagQuizSettings").unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_or_out_of_range_values_fall_back() {
        let (service, repo) = service();
        repo.put_raw("flagQuizSettings", "nonsense").unwrap();
        repo.put_raw(
            "capitalQuizSettings",
            r#"{"region":"all","questionCount":500,"difficulty":"easy"}"#,
        )
        .unwrap();

        assert_eq!(service.load(VariantId::Flag).await.unwrap(), QuizSettings::default());
        assert_eq!(service.load(VariantId::Capital).await.unwrap(), QuizSettings::default());
    }
}
