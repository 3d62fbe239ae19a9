use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a country (ISO 3166-1 alpha-3 code, e.g. `FRA`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a new `CountryCode`, normalizing to upper case.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the underlying code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier for one running quiz session, used to correlate log lines.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

/// The quiz variants sharing the session engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariantId {
    #[serde(rename = "flag")]
    Flag,
    #[serde(rename = "capital")]
    Capital,
    #[serde(rename = "flag-to-capital")]
    FlagToCapital,
}

impl VariantId {
    pub const ALL: [VariantId; 3] = [VariantId::Flag, VariantId::Capital, VariantId::FlagToCapital];

    /// Stable tag used on the command line and as the stats mapping key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VariantId::Flag => "flag",
            VariantId::Capital => "capital",
            VariantId::FlagToCapital => "flag-to-capital",
        }
    }

    /// Key-value entry holding this variant's persisted settings.
    #[must_use]
    pub fn settings_key(self) -> &'static str {
        match self {
            VariantId::Flag => "flagQuizSettings",
            VariantId::Capital => "capitalQuizSettings",
            VariantId::FlagToCapital => "flagToCapitalQuizSettings",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            VariantId::Flag => "Flag Challenge",
            VariantId::Capital => "Capital Cities Quiz",
            VariantId::FlagToCapital => "Flag to Capital Quiz",
        }
    }
}

impl fmt::Debug for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryCode({})", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Debug for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariantId({})", self.as_str())
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from {:?}", self.kind, self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for CountryCode {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParseIdError {
                kind: "CountryCode",
                raw: s.to_string(),
            });
        }
        Ok(CountryCode::new(trimmed))
    }
}

impl FromStr for VariantId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flag" => Ok(VariantId::Flag),
            "capital" => Ok(VariantId::Capital),
            "flag-to-capital" | "flagtocapital" => Ok(VariantId::FlagToCapital),
            _ => Err(ParseIdError {
                kind: "VariantId",
                raw: s.to_string(),
            }),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
