//! Plain-text presenter for a line-oriented terminal.

use std::io::Write;

use geoquiz_core::clock::Urgency;
use geoquiz_core::model::{QuestionPrompt, SettingsSummary};
use services::{Presenter, QuestionView, RenderError, SessionResults};

use crate::input::{HELP, SharedOptions};

pub struct TerminalPresenter<W> {
    out: W,
    options: SharedOptions,
    elapsed: String,
    quit_armed: bool,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W, options: SharedOptions) -> Self {
        Self {
            out,
            options,
            elapsed: "00:00".into(),
            quit_armed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> Result<(), RenderError> {
        writeln!(self.out, "{text}")
            .and_then(|()| self.out.flush())
            .map_err(|_| RenderError::TargetMissing("terminal"))
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn render_start(
        &mut self,
        summary: &SettingsSummary,
        notice: Option<&str>,
    ) -> Result<(), RenderError> {
        self.options.clear();
        self.line(&format!("\n== {} ==", summary.title))?;
        self.line(&format!(
            "Region: {} | Questions: {} | Difficulty: {}",
            summary.region, summary.question_count, summary.difficulty
        ))?;
        if let Some(notice) = notice {
            self.line(&format!("! {notice}"))?;
        }
        self.line(HELP)
    }

    fn render_question(&mut self, view: &QuestionView) -> Result<(), RenderError> {
        self.quit_armed = false;
        self.options
            .replace(view.options.iter().map(|option| option.id.clone()).collect());

        self.line(&format!(
            "\nQuestion {}/{}: {}",
            view.number, view.total, view.prompt_text
        ))?;
        let detail = match &view.prompt {
            QuestionPrompt::Flag { image } | QuestionPrompt::FlagForCapital { image } => {
                format!("  Flag: {image}")
            }
            QuestionPrompt::CapitalName { capital } => format!("  Capital: {capital}"),
        };
        self.line(&detail)?;
        for (idx, option) in view.options.iter().enumerate() {
            self.line(&format!("  {}) {}", idx + 1, option.label))?;
        }
        Ok(())
    }

    fn render_countdown(&mut self, remaining: u32, urgency: Urgency) -> Result<(), RenderError> {
        match urgency {
            Urgency::Normal => Ok(()),
            Urgency::Warning if remaining == 10 => self.line("  [10s left]"),
            Urgency::Warning => Ok(()),
            Urgency::Critical => self.line(&format!("  [{remaining}s left!]")),
        }
    }

    fn render_elapsed(&mut self, elapsed: &str) -> Result<(), RenderError> {
        elapsed.clone_into(&mut self.elapsed);
        Ok(())
    }

    fn render_score(&mut self, score: u32) -> Result<(), RenderError> {
        let status = format!("Score: {score} | Time: {}", self.elapsed);
        self.line(&status)
    }

    fn render_hint(&mut self, text: &str) -> Result<(), RenderError> {
        self.quit_armed = false;
        self.line(&format!("Hint: {text}"))
    }

    fn render_feedback(&mut self, message: &str, is_correct: bool) -> Result<(), RenderError> {
        self.options.clear();
        self.quit_armed = false;
        let mark = if is_correct { "+" } else { "-" };
        self.line(&format!("{mark} {message}"))
    }

    fn render_notice(&mut self, text: &str) -> Result<(), RenderError> {
        self.quit_armed = false;
        self.line(&format!("! {text}"))
    }

    fn render_results(&mut self, results: &SessionResults) -> Result<(), RenderError> {
        self.options.clear();
        self.line("\n== Quiz complete ==")?;
        self.line(&format!(
            "Final score: {}/{} ({}%)",
            results.score, results.max_score, results.percentage
        ))?;
        self.line(&format!("Time: {}", results.elapsed))?;
        let summary = &results.summary;
        self.line(&format!(
            "{} | {} | {} questions | {}",
            summary.title, summary.region, summary.question_count, summary.difficulty
        ))?;
        if let Some(stats) = results.stats {
            self.line(&format!(
                "Best score: {} | Best percentage: {}% | Games played: {}",
                stats.best_score, stats.best_percentage, stats.games_played
            ))?;
        }
        self.line("Press p to play again or m for home.")
    }

    fn render_load_error(&mut self) -> Result<(), RenderError> {
        self.line("Failed to load country data. Press r to retry.")
    }

    fn render_home(&mut self) -> Result<(), RenderError> {
        self.options.clear();
        self.quit_armed = false;
        self.line("\nHome. Press s to open the quiz or x to exit.")
    }

    /// Quitting needs `q` twice in a row while a question is up.
    fn confirm_quit(&mut self) -> bool {
        if self.quit_armed {
            self.quit_armed = false;
            return true;
        }
        self.quit_armed = true;
        if let Err(err) = self.line("Press q again to abandon this quiz.") {
            tracing::warn!(%err, "could not show quit prompt");
        }
        false
    }
}
