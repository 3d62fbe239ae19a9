use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::country::{Region, UnknownRegion};

/// Smallest and largest accepted number of questions per session.
pub const MIN_QUESTION_COUNT: u32 = 1;
pub const MAX_QUESTION_COUNT: u32 = 50;

//
// ─── REGION FILTER ─────────────────────────────────────────────────────────────
//

/// Region restriction for a session: every region, or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RegionFilter {
    #[default]
    All,
    Only(Region),
}

impl RegionFilter {
    #[must_use]
    pub fn matches(self, region: Option<Region>) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(wanted) => region == Some(wanted),
        }
    }

    /// Human label, e.g. "All Regions" or "Europe".
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RegionFilter::All => "All Regions",
            RegionFilter::Only(region) => region.as_str(),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => f.write_str("all"),
            RegionFilter::Only(region) => f.write_str(region.as_str()),
        }
    }
}

impl FromStr for RegionFilter {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(RegionFilter::All);
        }
        s.parse::<Region>().map(RegionFilter::Only)
    }
}

impl TryFrom<String> for RegionFilter {
    type Error = UnknownRegion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionFilter> for String {
    fn from(value: RegionFilter) -> Self {
        value.to_string()
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Per-variant session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    region: RegionFilter,
    question_count: u32,
    difficulty: Difficulty,
}

/// Partial update of `QuizSettings`; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizSettingsDraft {
    pub region: Option<RegionFilter>,
    pub question_count: Option<u32>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("question count must be between 1 and 50, got {0}")]
    InvalidQuestionCount(u32),
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the draft over `current` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidQuestionCount` if the resulting count is out of range.
    pub fn apply_to(self, current: &QuizSettings) -> Result<QuizSettings, QuizSettingsError> {
        QuizSettings::new(
            self.region.unwrap_or(current.region),
            self.question_count.unwrap_or(current.question_count),
            self.difficulty.unwrap_or(current.difficulty),
        )
    }
}

impl QuizSettings {
    /// # Errors
    ///
    /// Returns `QuizSettingsError::InvalidQuestionCount` if `question_count` is out of range.
    pub fn new(
        region: RegionFilter,
        question_count: u32,
        difficulty: Difficulty,
    ) -> Result<Self, QuizSettingsError> {
        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&question_count) {
            return Err(QuizSettingsError::InvalidQuestionCount(question_count));
        }
        Ok(Self {
            region,
            question_count,
            difficulty,
        })
    }

    /// Re-check settings that came back from storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError` if the stored count is out of range.
    pub fn validated(self) -> Result<Self, QuizSettingsError> {
        Self::new(self.region, self.question_count, self.difficulty)
    }

    #[must_use]
    pub fn region(&self) -> RegionFilter {
        self.region
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Same settings with the region widened to every region.
    #[must_use]
    pub fn with_all_regions(self) -> Self {
        Self {
            region: RegionFilter::All,
            ..self
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            region: RegionFilter::All,
            question_count: 10,
            difficulty: Difficulty::Easy,
        }
    }
}

/// Presentation-agnostic recap of the active settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSummary {
    pub title: &'static str,
    pub region: &'static str,
    pub question_count: u32,
    pub difficulty: Difficulty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_game() {
        let settings = QuizSettings::default();
        assert_eq!(settings.region(), RegionFilter::All);
        assert_eq!(settings.question_count(), 10);
        assert_eq!(settings.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn draft_keeps_unset_fields() {
        let current = QuizSettings::default();
        let updated = QuizSettingsDraft {
            region: Some(RegionFilter::Only(Region::Europe)),
            ..QuizSettingsDraft::new()
        }
        .apply_to(&current)
        .unwrap();

        assert_eq!(updated.region(), RegionFilter::Only(Region::Europe));
        assert_eq!(updated.question_count(), 10);
        assert_eq!(updated.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn zero_questions_rejected() {
        let err = QuizSettingsDraft {
            question_count: Some(0),
            ..QuizSettingsDraft::new()
        }
        .apply_to(&QuizSettings::default())
        .unwrap_err();
        assert_eq!(err, QuizSettingsError::InvalidQuestionCount(0));
    }

    #[test]
    fn settings_json_layout() {
        let settings =
            QuizSettings::new(RegionFilter::Only(Region::Oceania), 15, Difficulty::Hard).unwrap();
        let json = serde_json::to_value(settings).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"region": "Oceania", "questionCount": 15, "difficulty": "hard"})
        );

        let back: QuizSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn all_region_serializes_lowercase() {
        let json = serde_json::to_string(&RegionFilter::All).unwrap();
        assert_eq!(json, "\"all\"");
        assert_eq!(RegionFilter::All.label(), "All Regions");
    }
}
