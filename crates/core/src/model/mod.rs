mod country;
mod ids;
mod question;
mod settings;
mod stats;

pub use ids::{CountryCode, ParseIdError, SessionId, VariantId};

pub use country::{CountryDraft, CountryError, CountryRecord, Region, UnknownRegion};
pub use question::{AnswerOption, Hint, HintKind, Question, QuestionPrompt};
pub use settings::{
    Difficulty, MAX_QUESTION_COUNT, MIN_QUESTION_COUNT, QuizSettings, QuizSettingsDraft,
    QuizSettingsError, RegionFilter, SettingsSummary, UnknownDifficulty,
};
pub use stats::{QuizStats, VariantStats};
