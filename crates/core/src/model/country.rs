use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::CountryCode;

//
// ─── REGION ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown region: {0}")]
pub struct UnknownRegion(pub String);

/// World regions as reported by the country dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Africa,
    Americas,
    Antarctic,
    Asia,
    Europe,
    Oceania,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Africa,
        Region::Americas,
        Region::Antarctic,
        Region::Asia,
        Region::Europe,
        Region::Oceania,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::Americas => "Americas",
            Region::Antarctic => "Antarctic",
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

//
// ─── COUNTRY RECORD ────────────────────────────────────────────────────────────
//

/// Immutable fact sheet for one country.
///
/// Records come from the external data provider and are never mutated by the
/// engine. Optional fields stay optional here; each quiz variant decides which
/// of them a record must carry to be eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    id: CountryCode,
    common_name: String,
    capital: Option<String>,
    region: Option<Region>,
    population: u64,
    area: Option<f64>,
    languages: Vec<String>,
    flag_image: Option<String>,
}

/// Builder-style input for a `CountryRecord`.
#[derive(Debug, Clone, Default)]
pub struct CountryDraft {
    pub id: String,
    pub common_name: String,
    pub capital: Option<String>,
    pub region: Option<Region>,
    pub population: u64,
    pub area: Option<f64>,
    pub languages: Vec<String>,
    pub flag_image: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CountryError {
    #[error("country code cannot be empty")]
    MissingCode,
    #[error("country {code} has no common name")]
    MissingName { code: String },
}

impl CountryDraft {
    /// Validate and normalize the draft.
    ///
    /// Blank capitals, languages and flag references are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `CountryError` if the code or name is blank.
    pub fn validate(self) -> Result<CountryRecord, CountryError> {
        let code = self.id.trim();
        if code.is_empty() {
            return Err(CountryError::MissingCode);
        }
        let common_name = self.common_name.trim().to_string();
        if common_name.is_empty() {
            return Err(CountryError::MissingName {
                code: code.to_string(),
            });
        }

        Ok(CountryRecord {
            id: CountryCode::new(code),
            common_name,
            capital: normalize_optional(self.capital),
            region: self.region,
            population: self.population,
            area: self.area.filter(|area| area.is_finite() && *area >= 0.0),
            languages: self
                .languages
                .into_iter()
                .map(|lang| lang.trim().to_string())
                .filter(|lang| !lang.is_empty())
                .collect(),
            flag_image: normalize_optional(self.flag_image),
        })
    }
}

impl CountryRecord {
    #[must_use]
    pub fn id(&self) -> &CountryCode {
        &self.id
    }

    #[must_use]
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    #[must_use]
    pub fn capital(&self) -> Option<&str> {
        self.capital.as_deref()
    }

    #[must_use]
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population
    }

    #[must_use]
    pub fn area(&self) -> Option<f64> {
        self.area
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// First listed language, if any.
    #[must_use]
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }

    #[must_use]
    pub fn flag_image(&self) -> Option<&str> {
        self.flag_image.as_deref()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_parses_case_insensitively() {
        assert_eq!("oceania".parse::<Region>().unwrap(), Region::Oceania);
        assert!("Atlantis".parse::<Region>().is_err());
    }

    #[test]
    fn draft_normalizes_blank_optionals() {
        let record = CountryDraft {
            id: "nzl".into(),
            common_name: " New Zealand ".into(),
            capital: Some("  ".into()),
            region: Some(Region::Oceania),
            population: 5_000_000,
            area: Some(f64::NAN),
            languages: vec!["English".into(), " ".into(), "Māori".into()],
            flag_image: None,
        }
        .validate()
        .unwrap();

        assert_eq!(record.id().as_str(), "NZL");
        assert_eq!(record.common_name(), "New Zealand");
        assert_eq!(record.capital(), None);
        assert_eq!(record.area(), None);
        assert_eq!(record.languages(), ["English", "Māori"]);
        assert_eq!(record.primary_language(), Some("English"));
    }

    #[test]
    fn draft_requires_name() {
        let err = CountryDraft {
            id: "XXX".into(),
            ..CountryDraft::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, CountryError::MissingName { .. }));
    }
}
