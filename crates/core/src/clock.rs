//! Timer bookkeeping for a quiz session.
//!
//! The clock never sleeps itself. It asks a [`TimerDriver`] to deliver
//! [`TimerToken`]s and decides, on delivery, whether a token is still live.
//! Each scope carries an epoch; cancelling a scope bumps it, so ticks that were
//! already in flight from a cancelled timer are rejected by [`SessionClock::accept`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::time::Clock;

/// Budget for answering one question.
pub const QUESTION_TIME_LIMIT: Duration = Duration::from_secs(30);
/// Pause between a resolved question and the next one.
pub const FEEDBACK_DELAY: Duration = Duration::from_secs(2);
/// Period of the elapsed and countdown timers.
pub const TICK: Duration = Duration::from_secs(1);

const WARNING_AT_SECS: u32 = 10;
const CRITICAL_AT_SECS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerScope {
    /// Lives from session start to completion or quit.
    Session,
    /// Lives for one question and its feedback pause.
    Question,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Elapsed,
    QuestionTick,
    FeedbackDelay,
}

impl TimerKind {
    #[must_use]
    pub fn scope(self) -> TimerScope {
        match self {
            TimerKind::Elapsed => TimerScope::Session,
            TimerKind::QuestionTick | TimerKind::FeedbackDelay => TimerScope::Question,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSchedule {
    Every(Duration),
    After(Duration),
}

/// Identity of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub epoch: u64,
}

/// Something that can deliver tokens later.
///
/// Implementations must stop delivering every token of `scope` once
/// `cancel(scope)` returns. Tokens already queued may still arrive; the clock
/// filters them.
pub trait TimerDriver: Send {
    fn arm(&mut self, token: TimerToken, schedule: TimerSchedule);
    fn cancel(&mut self, scope: TimerScope);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Urgency {
    #[must_use]
    pub fn for_remaining(secs: u32) -> Self {
        if secs <= CRITICAL_AT_SECS {
            Urgency::Critical
        } else if secs <= WARNING_AT_SECS {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

/// What an accepted token means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Elapsed { secs: u64 },
    Countdown { remaining: u32, urgency: Urgency },
    /// The countdown reached zero. Emitted at most once per armed question timer.
    Expired,
    FeedbackDone,
}

pub struct SessionClock {
    driver: Box<dyn TimerDriver>,
    clock: Clock,
    session_epoch: u64,
    question_epoch: u64,
    started_at: Option<DateTime<Utc>>,
    remaining_secs: u32,
    expired: bool,
}

impl fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClock")
            .field("session_epoch", &self.session_epoch)
            .field("question_epoch", &self.question_epoch)
            .field("started_at", &self.started_at)
            .field("remaining_secs", &self.remaining_secs)
            .field("expired", &self.expired)
            .finish_non_exhaustive()
    }
}

impl SessionClock {
    #[must_use]
    pub fn new(driver: Box<dyn TimerDriver>, clock: Clock) -> Self {
        Self {
            driver,
            clock,
            session_epoch: 0,
            question_epoch: 0,
            started_at: None,
            remaining_secs: budget_secs(),
            expired: false,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Whole seconds since `arm_elapsed`, read from the wall clock.
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.started_at.map_or(0, |started| {
            u64::try_from((self.clock.now() - started).num_seconds()).unwrap_or(0)
        })
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn urgency(&self) -> Urgency {
        Urgency::for_remaining(self.remaining_secs)
    }

    /// Restart the elapsed timer from zero.
    pub fn arm_elapsed(&mut self) {
        self.cancel_scope(TimerScope::Session);
        self.started_at = Some(self.clock.now());
        self.driver.arm(
            TimerToken {
                kind: TimerKind::Elapsed,
                epoch: self.session_epoch,
            },
            TimerSchedule::Every(TICK),
        );
    }

    /// Start a fresh countdown, replacing anything in the question scope.
    pub fn arm_question(&mut self) {
        self.cancel_question();
        self.remaining_secs = budget_secs();
        self.expired = false;
        self.driver.arm(
            TimerToken {
                kind: TimerKind::QuestionTick,
                epoch: self.question_epoch,
            },
            TimerSchedule::Every(TICK),
        );
    }

    /// Stop the countdown and schedule the one-shot feedback pause.
    pub fn arm_feedback_delay(&mut self) {
        self.cancel_question();
        self.driver.arm(
            TimerToken {
                kind: TimerKind::FeedbackDelay,
                epoch: self.question_epoch,
            },
            TimerSchedule::After(FEEDBACK_DELAY),
        );
    }

    pub fn cancel_question(&mut self) {
        self.cancel_scope(TimerScope::Question);
    }

    pub fn cancel_all(&mut self) {
        self.cancel_scope(TimerScope::Question);
        self.cancel_scope(TimerScope::Session);
    }

    /// Interpret a delivered token, or `None` when it belongs to a cancelled timer.
    pub fn accept(&mut self, token: TimerToken) -> Option<ClockEvent> {
        let live = match token.kind.scope() {
            TimerScope::Session => self.session_epoch,
            TimerScope::Question => self.question_epoch,
        };
        if token.epoch != live {
            tracing::debug!(?token, live, "dropping stale timer token");
            return None;
        }

        match token.kind {
            TimerKind::Elapsed => {
                // A fixed clock only moves with the ticks it is shown.
                self.clock.advance(tick_delta());
                Some(ClockEvent::Elapsed {
                    secs: self.elapsed_secs(),
                })
            }
            TimerKind::QuestionTick => {
                if self.expired {
                    return None;
                }
                self.remaining_secs = self.remaining_secs.saturating_sub(1);
                if self.remaining_secs == 0 {
                    self.expired = true;
                    self.cancel_question();
                    Some(ClockEvent::Expired)
                } else {
                    Some(ClockEvent::Countdown {
                        remaining: self.remaining_secs,
                        urgency: self.urgency(),
                    })
                }
            }
            TimerKind::FeedbackDelay => {
                self.cancel_question();
                Some(ClockEvent::FeedbackDone)
            }
        }
    }

    fn cancel_scope(&mut self, scope: TimerScope) {
        self.driver.cancel(scope);
        match scope {
            TimerScope::Session => self.session_epoch = self.session_epoch.wrapping_add(1),
            TimerScope::Question => self.question_epoch = self.question_epoch.wrapping_add(1),
        }
    }
}

fn tick_delta() -> chrono::Duration {
    chrono::Duration::from_std(TICK).unwrap_or_else(|_| chrono::Duration::seconds(1))
}

fn budget_secs() -> u32 {
    u32::try_from(QUESTION_TIME_LIMIT.as_secs()).unwrap_or(u32::MAX)
}
