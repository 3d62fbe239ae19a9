use std::fmt;

use crate::model::country::CountryRecord;
use crate::model::ids::CountryCode;

//
// ─── HINTS ─────────────────────────────────────────────────────────────────────
//

/// Kinds of hint a variant can offer. Each kind is revealed at most once per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HintKind {
    CountryName,
    Capital,
    Region,
    Population,
    Area,
    Language,
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HintKind::CountryName => "country",
            HintKind::Capital => "capital",
            HintKind::Region => "region",
            HintKind::Population => "population",
            HintKind::Area => "area",
            HintKind::Language => "language",
        };
        f.write_str(label)
    }
}

/// A revealable hint: its kind plus the rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub kind: HintKind,
    pub text: String,
}

impl Hint {
    #[must_use]
    pub fn new(kind: HintKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// What the player is shown before answering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionPrompt {
    /// "Which country does this flag belong to?"
    Flag { image: String },
    /// "Which country has this capital city?"
    CapitalName { capital: String },
    /// "What is the capital of the country with this flag?"
    FlagForCapital { image: String },
}

impl QuestionPrompt {
    #[must_use]
    pub fn text(&self) -> &'static str {
        match self {
            QuestionPrompt::Flag { .. } => "Which country does this flag belong to?",
            QuestionPrompt::CapitalName { .. } => "Which country has this capital city?",
            QuestionPrompt::FlagForCapital { .. } => {
                "What is the capital of the country with this flag?"
            }
        }
    }
}

/// One selectable answer. `id` is the code of the country the option was drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub id: CountryCode,
    pub label: String,
}

/// A single multiple-choice question, alive until it resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    correct: CountryRecord,
    prompt: QuestionPrompt,
    options: Vec<AnswerOption>,
}

impl Question {
    #[must_use]
    pub fn new(correct: CountryRecord, prompt: QuestionPrompt, options: Vec<AnswerOption>) -> Self {
        Self {
            correct,
            prompt,
            options,
        }
    }

    #[must_use]
    pub fn correct(&self) -> &CountryRecord {
        &self.correct
    }

    #[must_use]
    pub fn prompt(&self) -> &QuestionPrompt {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, id: &CountryCode) -> bool {
        self.options.iter().any(|option| &option.id == id)
    }

    #[must_use]
    pub fn is_correct(&self, id: &CountryCode) -> bool {
        self.correct.id() == id
    }

    /// Label of the correct option, e.g. the country name or its capital.
    #[must_use]
    pub fn correct_label(&self) -> &str {
        self.options
            .iter()
            .find(|option| self.is_correct(&option.id))
            .map_or(self.correct.common_name(), |option| option.label.as_str())
    }
}
