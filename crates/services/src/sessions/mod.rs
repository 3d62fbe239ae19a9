mod engine;
mod presenter;
mod runner;
mod timers;

pub use engine::{OPTIONS_PER_QUESTION, Phase, SessionEngine, UserIntent};
pub use presenter::{Presenter, QuestionView, SessionResults};
pub use runner::run_session;
pub use timers::{ArmedTimer, ManualTimerDriver, TokioTimerDriver};
