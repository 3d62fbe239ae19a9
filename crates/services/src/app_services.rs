use std::sync::Arc;

use storage::repository::Storage;

use crate::country_provider::{CountryProvider, ProviderConfig, RestCountriesProvider};
use crate::error::AppServicesError;
use crate::settings_service::SettingsService;
use crate::stats_service::StatsService;

/// The collaborators a session engine needs, assembled once per process.
#[derive(Clone)]
pub struct GeoQuizServices {
    pub provider: Arc<dyn CountryProvider>,
    pub settings: SettingsService,
    pub stats: StatsService,
}

impl GeoQuizServices {
    #[must_use]
    pub fn new(storage: &Storage, provider: Arc<dyn CountryProvider>) -> Self {
        Self {
            provider,
            settings: SettingsService::new(Arc::clone(&storage.settings)),
            stats: StatsService::new(Arc::clone(&storage.stats)),
        }
    }

    /// Services over an in-memory store, for tests and throwaway runs.
    #[must_use]
    pub fn in_memory(provider: Arc<dyn CountryProvider>) -> Self {
        Self::new(&Storage::in_memory(), provider)
    }

    /// Build services backed by `SQLite` storage and the REST Countries API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        provider: ProviderConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let provider: Arc<dyn CountryProvider> = Arc::new(RestCountriesProvider::new(provider));
        Ok(Self::new(&storage, provider))
    }
}
