#![forbid(unsafe_code)]

pub mod app_services;
pub mod country_provider;
pub mod error;
pub mod sessions;
pub mod settings_service;
pub mod stats_service;
pub mod variants;

pub use geoquiz_core::Clock;

pub use app_services::GeoQuizServices;
pub use country_provider::{
    CountryProvider, ProviderConfig, RestCountriesProvider, StaticCountryProvider,
};
pub use error::{
    AppServicesError, CatalogError, EngineError, ProviderConfigError, RenderError,
    SettingsServiceError, StatsError,
};
pub use sessions::{
    ManualTimerDriver, Phase, Presenter, QuestionView, SessionEngine, SessionResults,
    TokioTimerDriver, UserIntent, run_session,
};
pub use settings_service::SettingsService;
pub use stats_service::StatsService;
pub use variants::{QuizVariant, variant_for};
