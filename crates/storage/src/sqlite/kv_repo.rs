use async_trait::async_trait;
use geoquiz_core::model::{QuizSettings, QuizStats, VariantId};
use serde::de::DeserializeOwned;
use sqlx::Row;

use crate::repository::{
    STATS_KEY, SettingsRepository, StatsRepository, StorageError, decode, encode,
};

use super::SqliteRepository;

impl SqliteRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|err| StorageError::Serialization(err.to_string()))
        })
        .transpose()
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get_value(key)
            .await?
            .map(|raw| decode(key, &raw))
            .transpose()
    }

    /// Write a raw value, bypassing serialization. Used to seed legacy data.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the write fails.
    pub async fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.put_value(key, value).await
    }
}

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self, variant: VariantId) -> Result<Option<QuizSettings>, StorageError> {
        self.read(variant.settings_key()).await
    }

    async fn save_settings(
        &self,
        variant: VariantId,
        settings: &QuizSettings,
    ) -> Result<(), StorageError> {
        self.put_value(variant.settings_key(), &encode(settings)?)
            .await
    }
}

#[async_trait]
impl StatsRepository for SqliteRepository {
    async fn get_stats(&self) -> Result<Option<QuizStats>, StorageError> {
        self.read(STATS_KEY).await
    }

    async fn save_stats(&self, stats: &QuizStats) -> Result<(), StorageError> {
        self.put_value(STATS_KEY, &encode(stats)?).await
    }
}
