use geoquiz_core::clock::Urgency;
use geoquiz_core::model::{AnswerOption, QuestionPrompt, SettingsSummary, VariantStats};

use crate::error::RenderError;

/// What the player sees for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub number: u32,
    pub total: u32,
    pub prompt_text: &'static str,
    pub prompt: QuestionPrompt,
    pub options: Vec<AnswerOption>,
}

/// End-of-session recap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResults {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    /// Time taken, e.g. `"1m 23s"`.
    pub elapsed: String,
    pub summary: SettingsSummary,
    /// Updated stats for the variant, absent if recording failed.
    pub stats: Option<VariantStats>,
}

/// Output side of a session. The engine calls these in order and never
/// reenters; a failed render is logged and the session goes on.
pub trait Presenter: Send {
    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_start(
        &mut self,
        summary: &SettingsSummary,
        notice: Option<&str>,
    ) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_question(&mut self, view: &QuestionView) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_countdown(&mut self, remaining: u32, urgency: Urgency) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_elapsed(&mut self, elapsed: &str) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_score(&mut self, score: u32) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_hint(&mut self, text: &str) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_feedback(&mut self, message: &str, is_correct: bool) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_notice(&mut self, text: &str) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_results(&mut self, results: &SessionResults) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_load_error(&mut self) -> Result<(), RenderError>;

    /// # Errors
    ///
    /// Returns `RenderError` if the target surface is unavailable.
    fn render_home(&mut self) -> Result<(), RenderError>;

    /// Ask whether an in-progress session should really be abandoned.
    fn confirm_quit(&mut self) -> bool;
}
