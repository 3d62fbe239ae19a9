use std::env;

use async_trait::async_trait;
use geoquiz_core::model::{CountryDraft, CountryRecord, Region};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{CatalogError, ProviderConfigError};

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all?fields=name,cca3,capital,region,population,area,languages,flags";

/// Source of the full, unfiltered country catalog.
#[async_trait]
pub trait CountryProvider: Send + Sync {
    /// Fetch every country the source knows about.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failures, non-success statuses, or
    /// when nothing usable comes back.
    async fn fetch_all(&self) -> Result<Vec<CountryRecord>, CatalogError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    url: Url,
}

impl ProviderConfig {
    /// # Errors
    ///
    /// Returns `ProviderConfigError` if `raw` is not an absolute http(s) URL.
    pub fn new(raw: &str) -> Result<Self, ProviderConfigError> {
        let url = Url::parse(raw.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(ProviderConfigError::UnsupportedScheme(other.to_owned())),
        }
    }

    /// Read `GEOQUIZ_COUNTRIES_URL`, falling back to the public API.
    ///
    /// # Errors
    ///
    /// Returns `ProviderConfigError` if the variable holds an invalid URL.
    pub fn from_env() -> Result<Self, ProviderConfigError> {
        match env::var("GEOQUIZ_COUNTRIES_URL") {
            Ok(raw) if !raw.trim().is_empty() => Self::new(&raw),
            _ => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_COUNTRIES_URL).expect("default countries url should be valid"),
        }
    }
}

/// HTTP client for the REST Countries API.
#[derive(Clone)]
pub struct RestCountriesProvider {
    client: Client,
    config: ProviderConfig,
}

impl RestCountriesProvider {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CountryProvider for RestCountriesProvider {
    async fn fetch_all(&self) -> Result<Vec<CountryRecord>, CatalogError> {
        tracing::info!(url = %self.config.url, "fetching country catalog");
        let response = self.client.get(self.config.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        parse_countries(&body)
    }
}

/// Fixed catalog, for tests and offline runs.
#[derive(Clone, Debug, Default)]
pub struct StaticCountryProvider {
    records: Vec<CountryRecord>,
}

impl StaticCountryProvider {
    #[must_use]
    pub fn new(records: Vec<CountryRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CountryProvider for StaticCountryProvider {
    async fn fetch_all(&self) -> Result<Vec<CountryRecord>, CatalogError> {
        if self.records.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(self.records.clone())
    }
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct RawCountry {
    name: RawName,
    cca3: String,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    area: Option<f64>,
    #[serde(default)]
    languages: serde_json::Map<String, Value>,
    #[serde(default)]
    flags: Option<RawFlags>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    #[serde(default)]
    png: Option<String>,
}

impl RawCountry {
    fn into_draft(self) -> CountryDraft {
        let region = self.region.as_deref().and_then(|raw| match raw.parse::<Region>() {
            Ok(region) => Some(region),
            Err(err) => {
                tracing::debug!(code = %self.cca3, %err, "ignoring unknown region");
                None
            }
        });
        CountryDraft {
            id: self.cca3,
            common_name: self.name.common,
            capital: self.capital.into_iter().next(),
            region,
            population: self.population,
            area: self.area,
            languages: self
                .languages
                .into_iter()
                .filter_map(|(_, name)| name.as_str().map(str::to_owned))
                .collect(),
            flag_image: self.flags.and_then(|flags| flags.png),
        }
    }
}

/// Decode a REST Countries response body.
///
/// Records that fail to decode or validate are logged and skipped.
///
/// # Errors
///
/// Returns `CatalogError::Decode` if the body is not a JSON array and
/// `CatalogError::Empty` if no record survives.
pub fn parse_countries(body: &str) -> Result<Vec<CountryRecord>, CatalogError> {
    let entries: Vec<Value> = serde_json::from_str(body)?;
    let total = entries.len();

    let records: Vec<CountryRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let raw = match serde_json::from_value::<RawCountry>(entry) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(index = idx, %err, "skipping malformed country entry");
                    return None;
                }
            };
            match raw.into_draft().validate() {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(index = idx, %err, "skipping invalid country entry");
                    None
                }
            }
        })
        .collect();

    tracing::debug!(total, kept = records.len(), "decoded country catalog");
    if records.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(records)
}
