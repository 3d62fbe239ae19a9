//! Shared error types for the services crate.

use thiserror::Error;

use geoquiz_core::model::QuizSettingsError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while fetching or decoding the country catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("country data request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("country data is not a JSON array: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("country data contained no usable records")]
    Empty,
}

/// Errors emitted while validating the country provider configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderConfigError {
    #[error("invalid countries url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("countries url must use http or https, got {0}")]
    UnsupportedScheme(String),
}

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors a presenter reports back to the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RenderError {
    #[error("render target {0} is missing")]
    TargetMissing(&'static str),
}

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("failed to load country data")]
    DataLoadFailed(#[from] CatalogError),
    #[error("no candidates available for a question")]
    NoCandidates,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
