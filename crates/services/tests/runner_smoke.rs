use std::sync::{Arc, Mutex};
use std::time::Duration;

use geoquiz_core::clock::{TimerToken, Urgency};
use geoquiz_core::model::{
    CountryDraft, CountryRecord, Difficulty, QuizSettings, Region, RegionFilter, SettingsSummary,
    VariantId,
};
use geoquiz_core::time::fixed_clock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{
    GeoQuizServices, Phase, Presenter, QuestionView, RenderError, SessionEngine, SessionResults,
    StaticCountryProvider, TokioTimerDriver, UserIntent, run_session,
};
use tokio::sync::mpsc;

#[derive(Clone, Default)]
struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    fn log(&self, line: String) -> Result<(), RenderError> {
        self.0.lock().unwrap().push(line);
        Ok(())
    }

    fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Presenter for Transcript {
    fn render_start(
        &mut self,
        summary: &SettingsSummary,
        _notice: Option<&str>,
    ) -> Result<(), RenderError> {
        self.log(format!("start {}", summary.title))
    }

    fn render_question(&mut self, view: &QuestionView) -> Result<(), RenderError> {
        self.log(format!("question {}/{}", view.number, view.total))
    }

    fn render_countdown(&mut self, remaining: u32, _urgency: Urgency) -> Result<(), RenderError> {
        self.log(format!("countdown {remaining}"))
    }

    fn render_elapsed(&mut self, _elapsed: &str) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_score(&mut self, _score: u32) -> Result<(), RenderError> {
        Ok(())
    }

    fn render_hint(&mut self, text: &str) -> Result<(), RenderError> {
        self.log(format!("hint {text}"))
    }

    fn render_feedback(&mut self, message: &str, _is_correct: bool) -> Result<(), RenderError> {
        self.log(format!("feedback {message}"))
    }

    fn render_notice(&mut self, text: &str) -> Result<(), RenderError> {
        self.log(format!("notice {text}"))
    }

    fn render_results(&mut self, results: &SessionResults) -> Result<(), RenderError> {
        self.log(format!(
            "results {}/{} {}%",
            results.score, results.max_score, results.percentage
        ))
    }

    fn render_load_error(&mut self) -> Result<(), RenderError> {
        self.log("load error".into())
    }

    fn render_home(&mut self) -> Result<(), RenderError> {
        self.log("home".into())
    }

    fn confirm_quit(&mut self) -> bool {
        true
    }
}

fn catalog() -> Vec<CountryRecord> {
    [
        ("FRA", "France", "Paris"),
        ("DEU", "Germany", "Berlin"),
        ("ITA", "Italy", "Rome"),
        ("ESP", "Spain", "Madrid"),
        ("PRT", "Portugal", "Lisbon"),
    ]
    .into_iter()
    .map(|(code, name, capital)| {
        CountryDraft {
            id: code.into(),
            common_name: name.into(),
            capital: Some(capital.into()),
            region: Some(Region::Europe),
            population: 5_000_000,
            ..CountryDraft::default()
        }
        .validate()
        .unwrap()
    })
    .collect()
}

struct Rig {
    engine: SessionEngine,
    services: GeoQuizServices,
    transcript: Transcript,
    timers: mpsc::UnboundedReceiver<TimerToken>,
}

async fn rig(questions: u32) -> Rig {
    let services = GeoQuizServices::in_memory(Arc::new(StaticCountryProvider::new(catalog())));
    let settings =
        QuizSettings::new(RegionFilter::Only(Region::Europe), questions, Difficulty::Easy).unwrap();
    services
        .settings
        .save(VariantId::Capital, &settings)
        .await
        .unwrap();

    let transcript = Transcript::default();
    let (driver, timers) = TokioTimerDriver::new();
    let engine = SessionEngine::new(
        VariantId::Capital,
        services.clone(),
        Box::new(transcript.clone()),
        Box::new(driver),
        fixed_clock(),
    )
    .with_rng(StdRng::seed_from_u64(7));
    Rig {
        engine,
        services,
        transcript,
        timers,
    }
}

#[tokio::test(start_paused = true)]
async fn unanswered_question_times_out_and_completes() {
    let Rig {
        mut engine,
        services,
        transcript,
        timers,
    } = rig(1).await;
    let (tx, rx) = mpsc::channel(8);

    let runner = tokio::spawn(async move {
        run_session(&mut engine, rx, timers).await;
        engine
    });

    tx.send(UserIntent::Start).await.unwrap();
    tokio::time::sleep(Duration::from_secs(40)).await;
    tx.send(UserIntent::Shutdown).await.unwrap();
    let engine = runner.await.unwrap();

    assert_eq!(engine.phase(), Phase::Complete);
    assert_eq!(engine.score(), 0);
    assert!(engine.elapsed_secs() >= 30);

    let lines = transcript.lines();
    assert_eq!(lines.first().map(String::as_str), Some("start Capital Cities Quiz"));
    assert!(lines.contains(&"countdown 10".to_owned()));
    assert!(
        lines
            .iter()
            .any(|line| line.starts_with("feedback Time's up!"))
    );
    assert_eq!(lines.last().map(String::as_str), Some("results 0/3 0%"));

    let stats = services.stats.load().await.unwrap().get(VariantId::Capital);
    assert_eq!(stats.games_played, 1);
}

#[tokio::test(start_paused = true)]
async fn closing_the_intent_channel_stops_the_runner() {
    let Rig {
        mut engine,
        transcript,
        timers,
        ..
    } = rig(5).await;
    let (tx, rx) = mpsc::channel(8);
    tx.send(UserIntent::Start).await.unwrap();
    drop(tx);

    run_session(&mut engine, rx, timers).await;

    assert_eq!(engine.phase(), Phase::QuestionActive);
    assert_eq!(engine.remaining_secs(), 30);
    assert_eq!(
        transcript.lines().last().map(String::as_str),
        Some("countdown 30")
    );
}
