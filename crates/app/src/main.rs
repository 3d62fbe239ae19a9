mod input;
mod terminal;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use geoquiz_core::model::{Difficulty, QuizSettingsDraft, RegionFilter, VariantId};
use services::{
    Clock, GeoQuizServices, ProviderConfig, SessionEngine, SettingsService, StatsService,
    TokioTimerDriver, run_session,
};
use storage::repository::Storage;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::input::SharedOptions;
use crate::terminal::TerminalPresenter;

#[derive(Parser)]
#[command(
    name = "geoquiz",
    about = "Geography trivia quizzes: flags, capitals, and flags to capitals",
    version
)]
struct Cli {
    /// SQLite database URL or file path
    #[arg(long, global = true, env = "GEOQUIZ_DB_URL", default_value = "geoquiz.sqlite3")]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz in the terminal (default)
    Play {
        /// flag, capital, or flag-to-capital
        #[arg(short, long, env = "GEOQUIZ_VARIANT", default_value = "flag")]
        variant: VariantId,

        /// Country data endpoint; falls back to GEOQUIZ_COUNTRIES_URL, then the public API
        #[arg(long)]
        countries_url: Option<String>,
    },

    /// Show best scores and games played per variant
    Stats {
        /// Zero every variant's record first
        #[arg(long)]
        reset: bool,
    },

    /// Show or change a variant's saved settings
    Settings {
        #[arg(short, long, default_value = "flag")]
        variant: VariantId,

        /// A region name, or "all"
        #[arg(long)]
        region: Option<RegionFilter>,

        /// Questions per session, 1-50
        #[arg(long)]
        count: Option<u32>,

        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
}

#[derive(Debug)]
enum ArgsError {
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_owned(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn play(
    db_url: &str,
    variant: VariantId,
    countries_url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = countries_url.map_or_else(ProviderConfig::from_env, ProviderConfig::new)?;
    tracing::debug!(url = %provider.url(), "country source");
    let services = GeoQuizServices::new_sqlite(db_url, provider).await?;

    let options = SharedOptions::default();
    let presenter = TerminalPresenter::new(io::stdout(), options.clone());
    let (driver, timers) = TokioTimerDriver::new();
    let mut engine = SessionEngine::new(
        variant,
        services,
        Box::new(presenter),
        Box::new(driver),
        Clock::default_clock(),
    );

    let (tx, intents) = mpsc::channel(16);
    // The reader blocks on stdin and is left behind on exit.
    let _reader = input::spawn_reader(tx, options);
    run_session(&mut engine, intents, timers).await;
    Ok(())
}

async fn stats(db_url: &str, reset: bool) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::sqlite(db_url).await?;
    let service = StatsService::new(Arc::clone(&storage.stats));
    let stats = if reset {
        service.reset().await?
    } else {
        service.load().await?
    };

    for (variant, record) in stats.iter() {
        println!(
            "{:<22} best score {:>4} | best {:>3}% | played {}",
            variant.title(),
            record.best_score,
            record.best_percentage,
            record.games_played
        );
    }
    Ok(())
}

async fn settings(
    db_url: &str,
    variant: VariantId,
    draft: QuizSettingsDraft,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::sqlite(db_url).await?;
    let service = SettingsService::new(Arc::clone(&storage.settings));
    let mut current = service.load(variant).await?;
    if draft != QuizSettingsDraft::new() {
        current = service.update(variant, &current, draft).await?;
    }

    println!(
        "{}: region {} | {} questions | {}",
        variant.title(),
        current.region().label(),
        current.question_count(),
        current.difficulty()
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Open + migrate SQLite in the binary glue; services stay storage-agnostic.
    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_file(&db_url)?;

    match cli.command {
        None => play(&db_url, VariantId::Flag, None).await,
        Some(Commands::Play {
            variant,
            countries_url,
        }) => play(&db_url, variant, countries_url.as_deref()).await,
        Some(Commands::Stats { reset }) => stats(&db_url, reset).await,
        Some(Commands::Settings {
            variant,
            region,
            count,
            difficulty,
        }) => {
            let draft = QuizSettingsDraft {
                region,
                question_count: count,
                difficulty,
            };
            settings(&db_url, variant, draft).await
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
