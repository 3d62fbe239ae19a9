//! Line-based keyboard input, mapped onto engine intents.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use geoquiz_core::model::{CountryCode, QuizSettingsDraft};
use services::UserIntent;
use tokio::sync::mpsc;

pub const HELP: &str = "keys: s start | 1-4 answer | h hint | k skip | q quit | p play again | m home | r retry | x exit\n      set region=<name|all> count=<1-50> difficulty=<easy|hard>";

/// Option ids of the question on screen, shared between presenter and reader.
#[derive(Clone, Default)]
pub struct SharedOptions(Arc<Mutex<Vec<CountryCode>>>);

impl SharedOptions {
    pub fn replace(&self, ids: Vec<CountryCode>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = ids;
    }

    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<CountryCode> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputError {
    Empty,
    Unknown(String),
    NoSuchOption(usize),
    BadSetting(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => write!(f, "empty input"),
            InputError::Unknown(raw) => write!(f, "unknown command: {raw}"),
            InputError::NoSuchOption(n) => write!(f, "there is no option {n}"),
            InputError::BadSetting(raw) => write!(f, "invalid setting: {raw}"),
        }
    }
}

impl std::error::Error for InputError {}

/// Map one input line to an intent. `options` are the ids behind keys 1..=n.
///
/// # Errors
///
/// Returns `InputError` for blank, unknown or malformed lines.
pub fn parse_line(line: &str, options: &[CountryCode]) -> Result<UserIntent, InputError> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(InputError::Empty);
    };

    let intent = match head.to_ascii_lowercase().as_str() {
        "s" | "start" => UserIntent::Start,
        "h" | "hint" => UserIntent::RequestHint,
        "k" | "skip" => UserIntent::Skip,
        "q" | "quit" => UserIntent::Quit,
        "p" | "again" => UserIntent::PlayAgain,
        "m" | "home" => UserIntent::ReturnHome,
        "r" | "retry" => UserIntent::Retry,
        "x" | "exit" => UserIntent::Shutdown,
        "set" => UserIntent::ChangeSettings(parse_draft(words)?),
        other => match other.parse::<usize>() {
            Ok(n) => {
                let id = n
                    .checked_sub(1)
                    .and_then(|idx| options.get(idx))
                    .ok_or(InputError::NoSuchOption(n))?;
                UserIntent::SelectOption(id.clone())
            }
            Err(_) => return Err(InputError::Unknown(line.to_owned())),
        },
    };
    Ok(intent)
}

fn parse_draft<'a>(pairs: impl Iterator<Item = &'a str>) -> Result<QuizSettingsDraft, InputError> {
    let mut draft = QuizSettingsDraft::new();
    for pair in pairs {
        let bad = || InputError::BadSetting(pair.to_owned());
        let (key, value) = pair.split_once('=').ok_or_else(bad)?;
        match key {
            "region" => draft.region = Some(value.parse().map_err(|_| bad())?),
            "count" => draft.question_count = Some(value.parse().map_err(|_| bad())?),
            "difficulty" => draft.difficulty = Some(value.parse().map_err(|_| bad())?),
            _ => return Err(bad()),
        }
    }
    if draft == QuizSettingsDraft::new() {
        return Err(InputError::BadSetting("nothing to change".into()));
    }
    Ok(draft)
}

/// Read stdin on a plain thread and forward intents until EOF or the engine goes away.
pub fn spawn_reader(tx: mpsc::Sender<UserIntent>, options: SharedOptions) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(%err, "stdin read failed");
                    break;
                }
            };
            match parse_line(&line, &options.snapshot()) {
                Ok(intent) => {
                    let done = intent == UserIntent::Shutdown;
                    if tx.blocking_send(intent).is_err() || done {
                        break;
                    }
                }
                Err(InputError::Empty) => {}
                Err(err) => println!("{err}\n{HELP}"),
            }
        }
        tracing::debug!("input reader finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoquiz_core::model::{Difficulty, Region, RegionFilter};

    fn ids() -> Vec<CountryCode> {
        ["FRA", "DEU", "ITA", "ESP"]
            .into_iter()
            .map(|code| code.parse().unwrap())
            .collect()
    }

    #[test]
    fn digits_pick_options() {
        let options = ids();
        assert_eq!(
            parse_line(" 3 ", &options),
            Ok(UserIntent::SelectOption(options[2].clone()))
        );
        assert_eq!(parse_line("5", &options), Err(InputError::NoSuchOption(5)));
        assert_eq!(parse_line("0", &options), Err(InputError::NoSuchOption(0)));
        assert_eq!(parse_line("1", &[]), Err(InputError::NoSuchOption(1)));
    }

    #[test]
    fn letters_map_to_intents() {
        assert_eq!(parse_line("s", &[]), Ok(UserIntent::Start));
        assert_eq!(parse_line("HINT", &[]), Ok(UserIntent::RequestHint));
        assert_eq!(parse_line("q", &[]), Ok(UserIntent::Quit));
        assert_eq!(parse_line("x", &[]), Ok(UserIntent::Shutdown));
        assert_eq!(parse_line("   ", &[]), Err(InputError::Empty));
        assert!(matches!(parse_line("dance", &[]), Err(InputError::Unknown(_))));
    }

    #[test]
    fn set_builds_a_partial_draft() {
        let intent = parse_line("set region=oceania difficulty=hard", &[]).unwrap();
        assert_eq!(
            intent,
            UserIntent::ChangeSettings(QuizSettingsDraft {
                region: Some(RegionFilter::Only(Region::Oceania)),
                question_count: None,
                difficulty: Some(Difficulty::Hard),
            })
        );
        assert!(matches!(
            parse_line("set count=ten", &[]),
            Err(InputError::BadSetting(_))
        ));
        assert!(matches!(parse_line("set", &[]), Err(InputError::BadSetting(_))));
    }

    #[test]
    fn shared_options_follow_the_screen() {
        let shared = SharedOptions::default();
        shared.replace(ids());
        assert_eq!(shared.snapshot().len(), 4);
        shared.clear();
        assert!(shared.snapshot().is_empty());
    }
}
