use std::fmt;

use geoquiz_core::Clock;
use geoquiz_core::catalog::{self, CandidatePool};
use geoquiz_core::clock::{ClockEvent, SessionClock, TimerDriver, TimerToken, Urgency};
use geoquiz_core::ledger::{self, ScoreLedger};
use geoquiz_core::model::{
    CountryCode, CountryRecord, Question, QuizSettings, QuizSettingsDraft, SessionId,
    SettingsSummary, VariantId,
};
use geoquiz_core::selector::{self, UsedCandidates};
use geoquiz_core::time::{format_minutes_seconds, format_mm_ss};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::app_services::GeoQuizServices;
use crate::error::{EngineError, RenderError};
use crate::variants::{QuizVariant, variant_for};

use super::presenter::{Presenter, QuestionView, SessionResults};

/// Options per question: the answer plus three distractors.
pub const OPTIONS_PER_QUESTION: usize = 4;

//
// ─── PHASES & INTENTS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading { failed: bool },
    AwaitingStart,
    QuestionActive,
    Feedback,
    Complete,
}

/// Everything a player can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    Start,
    SelectOption(CountryCode),
    RequestHint,
    Skip,
    Quit,
    ChangeSettings(QuizSettingsDraft),
    PlayAgain,
    ReturnHome,
    Retry,
    Shutdown,
}

impl UserIntent {
    fn name(&self) -> &'static str {
        match self {
            UserIntent::Start => "start",
            UserIntent::SelectOption(_) => "select_option",
            UserIntent::RequestHint => "request_hint",
            UserIntent::Skip => "skip",
            UserIntent::Quit => "quit",
            UserIntent::ChangeSettings(_) => "change_settings",
            UserIntent::PlayAgain => "play_again",
            UserIntent::ReturnHome => "return_home",
            UserIntent::Retry => "retry",
            UserIntent::Shutdown => "shutdown",
        }
    }
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Quiz session state machine shared by every variant.
///
/// All mutation goes through `&mut self`, one intent or timer token at a time.
pub struct SessionEngine {
    variant: Box<dyn QuizVariant>,
    services: GeoQuizServices,
    presenter: Box<dyn Presenter>,
    clock: SessionClock,
    rng: StdRng,
    phase: Phase,
    session_id: SessionId,
    persisted: QuizSettings,
    eligible: Vec<CountryRecord>,
    pool: Option<CandidatePool>,
    used: UsedCandidates,
    ledger: ScoreLedger,
    initial_score: u32,
    question_index: u32,
    current: Option<Question>,
    quiz_started: bool,
}

impl fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEngine")
            .field("variant", &self.variant.id())
            .field("phase", &self.phase)
            .field("session_id", &self.session_id)
            .field("score", &self.ledger.score())
            .field("question_index", &self.question_index)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    #[must_use]
    pub fn new(
        variant: VariantId,
        services: GeoQuizServices,
        presenter: Box<dyn Presenter>,
        driver: Box<dyn TimerDriver>,
        clock: Clock,
    ) -> Self {
        Self {
            variant: variant_for(variant),
            services,
            presenter,
            clock: SessionClock::new(driver, clock),
            rng: StdRng::from_os_rng(),
            phase: Phase::Idle,
            session_id: SessionId::new_random(),
            persisted: QuizSettings::default(),
            eligible: Vec::new(),
            pool: None,
            used: UsedCandidates::new(),
            ledger: ScoreLedger::default(),
            initial_score: 0,
            question_index: 0,
            current: None,
            quiz_started: false,
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn variant(&self) -> VariantId {
        self.variant.id()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.ledger.score()
    }

    #[must_use]
    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn quiz_started(&self) -> bool {
        self.quiz_started
    }

    /// Settings as stored for this variant.
    #[must_use]
    pub fn persisted_settings(&self) -> QuizSettings {
        self.persisted
    }

    /// Settings the current session runs with, after any region fallback.
    #[must_use]
    pub fn effective_settings(&self) -> QuizSettings {
        self.pool
            .as_ref()
            .map_or(self.persisted, |pool| pool.settings)
    }

    #[must_use]
    pub fn max_possible_score(&self) -> u32 {
        ledger::max_possible_score(
            self.initial_score,
            self.effective_settings().question_count(),
        )
    }

    #[must_use]
    pub fn used_candidates(&self) -> &UsedCandidates {
        &self.used
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining_secs()
    }

    /// Route one intent to its operation. `Shutdown` only stops timers; the
    /// runner ends the loop.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` only when (re)loading the catalog fails.
    pub async fn dispatch(&mut self, intent: UserIntent) -> Result<(), EngineError> {
        tracing::debug!(session = %self.session_id, intent = intent.name(), phase = ?self.phase, "intent");
        match intent {
            UserIntent::Start => self.start().await?,
            UserIntent::SelectOption(id) => self.select_option(&id),
            UserIntent::RequestHint => self.request_hint(),
            UserIntent::Skip => self.skip(),
            UserIntent::Quit => self.quit(),
            UserIntent::ChangeSettings(draft) => self.change_settings(draft).await,
            UserIntent::PlayAgain => self.play_again(),
            UserIntent::ReturnHome => self.return_home(),
            UserIntent::Retry => self.retry().await?,
            UserIntent::Shutdown => self.shutdown(),
        }
        Ok(())
    }

    /// Load settings and the catalog, then wait for the player to start.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::DataLoadFailed` if the catalog cannot be fetched,
    /// or `EngineError::NoCandidates` if no record suits this variant. The
    /// engine stays in `Loading { failed: true }` and accepts `retry`.
    pub async fn init(&mut self) -> Result<(), EngineError> {
        if !matches!(self.phase, Phase::Idle | Phase::Loading { failed: true }) {
            self.ignored("init");
            return Ok(());
        }
        self.clock.cancel_all();
        self.phase = Phase::Loading { failed: false };
        tracing::info!(session = %self.session_id, variant = %self.variant.id(), "loading quiz");

        let variant = self.variant.id();
        self.persisted = match self.services.settings.load(variant).await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(%variant, %err, "settings unavailable, using defaults");
                QuizSettings::default()
            }
        };

        let catalog = match self.services.provider.fetch_all().await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(%variant, %err, "country data load failed");
                return Err(self.fail_loading(err.into()));
            }
        };

        let total = catalog.len();
        self.eligible = catalog
            .into_iter()
            .filter(|record| self.variant.is_eligible(record))
            .collect();
        tracing::debug!(total, eligible = self.eligible.len(), "filtered catalog for variant");
        if self.eligible.is_empty() {
            return Err(self.fail_loading(EngineError::NoCandidates));
        }

        let notice = self.rebuild_pool();
        self.phase = Phase::AwaitingStart;
        self.show_start(notice.as_deref());
        Ok(())
    }

    /// Re-enter loading after a failure.
    ///
    /// # Errors
    ///
    /// Same as [`SessionEngine::init`].
    pub async fn retry(&mut self) -> Result<(), EngineError> {
        if self.phase != (Phase::Loading { failed: true }) {
            self.ignored("retry");
            return Ok(());
        }
        self.init().await
    }

    /// Begin the first question. From `Idle` this reopens the quiz instead.
    ///
    /// # Errors
    ///
    /// Same as [`SessionEngine::init`] when reopening.
    pub async fn start(&mut self) -> Result<(), EngineError> {
        match self.phase {
            Phase::AwaitingStart => {
                self.begin_session();
                Ok(())
            }
            Phase::Idle => self.init().await,
            _ => {
                self.ignored("start");
                Ok(())
            }
        }
    }

    pub fn select_option(&mut self, id: &CountryCode) {
        if self.phase != Phase::QuestionActive {
            self.ignored("select_option");
            return;
        }
        let Some(question) = self.current.as_ref() else {
            return;
        };
        if !question.has_option(id) {
            tracing::debug!(option = %id, "selection is not an option of this question");
            return;
        }

        let (message, correct) = if question.is_correct(id) {
            let score = self.ledger.award_correct();
            (self.variant.correct_feedback(score), true)
        } else {
            self.ledger.penalize_incorrect();
            (self.variant.incorrect_feedback(question), false)
        };
        self.resolve(&message, correct);
    }

    /// Move on without scoring; the answer is still revealed.
    pub fn skip(&mut self) {
        if self.phase != Phase::QuestionActive {
            self.ignored("skip");
            return;
        }
        let Some(question) = self.current.as_ref() else {
            return;
        };
        let message = self.variant.skip_feedback(question);
        self.resolve(&message, false);
    }

    pub fn request_hint(&mut self) {
        if self.phase != Phase::QuestionActive {
            self.ignored("request_hint");
            return;
        }
        let Some(question) = self.current.as_ref() else {
            return;
        };

        let candidates = self
            .variant
            .hint_candidates(question.correct(), self.effective_settings().difficulty());
        match self.ledger.request_hint(candidates, &mut self.rng) {
            Ok(hint) => {
                tracing::debug!(kind = %hint.kind, score = self.ledger.score(), "hint revealed");
                report("hint", self.presenter.render_hint(&hint.text));
                report("score", self.presenter.render_score(self.ledger.score()));
            }
            Err(denied) => {
                report("notice", self.presenter.render_notice(&denied.to_string()));
            }
        }
    }

    /// Validate and persist new settings, then restart or return to the start screen.
    pub async fn change_settings(&mut self, draft: QuizSettingsDraft) {
        if matches!(self.phase, Phase::Idle | Phase::Loading { .. }) {
            self.ignored("change_settings");
            return;
        }

        let settings = match draft.apply_to(&self.persisted) {
            Ok(settings) => settings,
            Err(err) => {
                report("notice", self.presenter.render_notice(&err.to_string()));
                return;
            }
        };
        let variant = self.variant.id();
        if let Err(err) = self.services.settings.save(variant, &settings).await {
            tracing::warn!(%variant, %err, "failed to persist settings, keeping them for this run");
        }
        self.persisted = settings;

        let notice = self.rebuild_pool();
        if self.quiz_started {
            if let Some(notice) = &notice {
                report("notice", self.presenter.render_notice(notice));
            }
            self.begin_session();
        } else {
            self.clock.cancel_all();
            self.current = None;
            self.phase = Phase::AwaitingStart;
            self.show_start(notice.as_deref());
        }
    }

    pub fn play_again(&mut self) {
        if self.phase != Phase::Complete {
            self.ignored("play_again");
            return;
        }
        self.begin_session();
    }

    pub fn return_home(&mut self) {
        if self.phase != Phase::Complete {
            self.ignored("return_home");
            return;
        }
        self.go_home();
    }

    /// Abandon the session after the presenter confirms.
    pub fn quit(&mut self) {
        if self.phase == Phase::Idle {
            self.ignored("quit");
            return;
        }
        if !self.presenter.confirm_quit() {
            tracing::debug!("quit not confirmed");
            return;
        }
        tracing::info!(session = %self.session_id, "session quit");
        self.go_home();
    }

    /// Stop every timer. The engine can still be driven afterwards.
    pub fn shutdown(&mut self) {
        self.clock.cancel_all();
    }

    /// Handle a delivered timer token. Stale tokens are dropped.
    pub async fn on_timer(&mut self, token: TimerToken) {
        let Some(event) = self.clock.accept(token) else {
            return;
        };
        match event {
            ClockEvent::Elapsed { secs } => {
                if self.quiz_started {
                    report("elapsed", self.presenter.render_elapsed(&format_mm_ss(secs)));
                }
            }
            ClockEvent::Countdown { remaining, urgency } => {
                if self.phase == Phase::QuestionActive {
                    report("countdown", self.presenter.render_countdown(remaining, urgency));
                }
            }
            ClockEvent::Expired => {
                if self.phase == Phase::QuestionActive {
                    self.expire();
                }
            }
            ClockEvent::FeedbackDone => {
                if self.phase == Phase::Feedback {
                    self.advance().await;
                }
            }
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn ignored(&self, intent: &'static str) {
        tracing::debug!(intent, phase = ?self.phase, "ignoring intent in this phase");
    }

    fn fail_loading(&mut self, err: EngineError) -> EngineError {
        self.phase = Phase::Loading { failed: true };
        report("load_error", self.presenter.render_load_error());
        err
    }

    /// Rebuild the candidate pool from the persisted settings; returns the fallback notice.
    fn rebuild_pool(&mut self) -> Option<String> {
        let pool = catalog::build_pool(&self.eligible, self.persisted);
        let notice = pool.notice.as_ref().map(|notice| {
            tracing::info!(
                requested = %notice.requested,
                found = notice.found,
                "region too small, using all regions"
            );
            notice.message()
        });
        self.pool = Some(pool);
        self.used.clear();
        notice
    }

    fn summary(&self) -> SettingsSummary {
        let settings = self.effective_settings();
        SettingsSummary {
            title: self.variant.id().title(),
            region: settings.region().label(),
            question_count: settings.question_count(),
            difficulty: settings.difficulty(),
        }
    }

    fn show_start(&mut self, notice: Option<&str>) {
        let summary = self.summary();
        report("start", self.presenter.render_start(&summary, notice));
    }

    fn begin_session(&mut self) {
        self.clock.cancel_all();
        self.session_id = SessionId::new_random();
        self.initial_score = self.effective_settings().question_count();
        self.ledger.reset(self.initial_score);
        self.used.clear();
        self.question_index = 0;
        self.current = None;
        self.quiz_started = true;
        tracing::info!(
            session = %self.session_id,
            variant = %self.variant.id(),
            questions = self.initial_score,
            "session started"
        );

        self.clock.arm_elapsed();
        report("score", self.presenter.render_score(self.ledger.score()));
        report("elapsed", self.presenter.render_elapsed(&format_mm_ss(0)));
        self.next_question();
    }

    /// Show the next question, or report that the session is over.
    fn next_question(&mut self) -> bool {
        if self.question_index >= self.effective_settings().question_count() {
            return false;
        }
        let Some(question) = self.draw_question() else {
            tracing::warn!(session = %self.session_id, "no question could be built, ending session");
            return false;
        };

        self.question_index += 1;
        self.ledger.clear_hints();
        let view = QuestionView {
            number: self.question_index,
            total: self.effective_settings().question_count(),
            prompt_text: question.prompt().text(),
            prompt: question.prompt().clone(),
            options: question.options().to_vec(),
        };
        self.current = Some(question);
        self.phase = Phase::QuestionActive;

        report("question", self.presenter.render_question(&view));
        self.clock.arm_question();
        report(
            "countdown",
            self.presenter
                .render_countdown(self.clock.remaining_secs(), Urgency::Normal),
        );
        true
    }

    fn draw_question(&mut self) -> Option<Question> {
        let pool = self.pool.as_ref()?;
        for _ in 0..pool.len().max(1) {
            let round = selector::select_round(
                &pool.records,
                &mut self.used,
                OPTIONS_PER_QUESTION,
                &mut self.rng,
            )?;
            match self.variant.build_question(&round) {
                Some(question) => return Some(question),
                None => tracing::warn!(code = %round.correct.id(), "skipping malformed candidate"),
            }
        }
        None
    }

    fn resolve(&mut self, message: &str, correct: bool) {
        report("score", self.presenter.render_score(self.ledger.score()));
        report("feedback", self.presenter.render_feedback(message, correct));
        self.phase = Phase::Feedback;
        self.clock.arm_feedback_delay();
    }

    fn expire(&mut self) {
        let Some(question) = self.current.as_ref() else {
            return;
        };
        self.ledger.penalize_timeout();
        let message = self.variant.timeout_feedback(question);
        tracing::debug!(question = self.question_index, "question timed out");
        self.resolve(&message, false);
    }

    async fn advance(&mut self) {
        if !self.next_question() {
            self.complete().await;
        }
    }

    async fn complete(&mut self) {
        self.clock.cancel_all();
        self.phase = Phase::Complete;
        self.quiz_started = false;
        self.current = None;

        let score = self.ledger.score();
        let max_score = self.max_possible_score();
        let percentage = ledger::percentage(score, max_score);
        let variant = self.variant.id();
        tracing::info!(session = %self.session_id, %variant, score, max_score, percentage, "session complete");

        let stats = match self
            .services
            .stats
            .record_completion(variant, score, percentage)
            .await
        {
            Ok(stats) => Some(stats),
            Err(err) => {
                tracing::warn!(%variant, %err, "failed to record stats");
                None
            }
        };

        let results = SessionResults {
            score,
            max_score,
            percentage,
            elapsed: format_minutes_seconds(self.clock.elapsed_secs()),
            summary: self.summary(),
            stats,
        };
        report("results", self.presenter.render_results(&results));
    }

    fn go_home(&mut self) {
        self.clock.cancel_all();
        self.phase = Phase::Idle;
        self.quiz_started = false;
        self.current = None;
        self.used.clear();
        self.question_index = 0;
        self.ledger.reset(0);
        report("home", self.presenter.render_home());
    }
}

fn report(surface: &'static str, result: Result<(), RenderError>) {
    if let Err(err) = result {
        tracing::warn!(surface, %err, "render failed");
    }
}
