use async_trait::async_trait;
use geoquiz_core::model::{QuizSettings, QuizStats, VariantId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key of the single shared stats entry.
pub const STATS_KEY: &str = "geoQuizStats";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|err| StorageError::Serialization(format!("{key}: {err}")))
}

/// Per-variant quiz settings, one entry per variant.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch the stored settings for a variant, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed,
    /// or other storage errors.
    async fn get_settings(&self, variant: VariantId) -> Result<Option<QuizSettings>, StorageError>;

    /// Persist settings for a variant, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn save_settings(
        &self,
        variant: VariantId,
        settings: &QuizSettings,
    ) -> Result<(), StorageError>;
}

/// The aggregate stats mapping, stored as a single entry.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Fetch the stored stats mapping, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value is malformed,
    /// or other storage errors.
    async fn get_stats(&self) -> Result<Option<QuizStats>, StorageError>;

    /// Replace the stored stats mapping.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn save_stats(&self, stats: &QuizStats) -> Result<(), StorageError>;
}

/// In-memory key-value store holding JSON strings, for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a raw value under `key`, bypassing serialization.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get_raw(key)?
            .map(|raw| decode(key, &raw))
            .transpose()
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self, variant: VariantId) -> Result<Option<QuizSettings>, StorageError> {
        self.read(variant.settings_key())
    }

    async fn save_settings(
        &self,
        variant: VariantId,
        settings: &QuizSettings,
    ) -> Result<(), StorageError> {
        self.put_raw(variant.settings_key(), &encode(settings)?)
    }
}

#[async_trait]
impl StatsRepository for InMemoryRepository {
    async fn get_stats(&self) -> Result<Option<QuizStats>, StorageError> {
        self.read(STATS_KEY)
    }

    async fn save_stats(&self, stats: &QuizStats) -> Result<(), StorageError> {
        self.put_raw(STATS_KEY, &encode(stats)?)
    }
}

/// Aggregates the settings and stats repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
    pub stats: Arc<dyn StatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Use one repository for both concerns.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: SettingsRepository + StatsRepository + Clone + 'static,
    {
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn StatsRepository> = Arc::new(repo);
        Self { settings, stats }
    }
}
