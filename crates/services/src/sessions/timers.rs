use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use geoquiz_core::clock::{TimerDriver, TimerKind, TimerSchedule, TimerScope, TimerToken};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Drives session timers with `tokio::time`, delivering tokens over a channel.
///
/// Must be armed from inside a tokio runtime.
pub struct TokioTimerDriver {
    tx: mpsc::UnboundedSender<TimerToken>,
    handles: HashMap<TimerScope, Vec<JoinHandle<()>>>,
}

impl TokioTimerDriver {
    /// A driver plus the receiving end the session runner listens on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                handles: HashMap::new(),
            },
            rx,
        )
    }
}

impl TimerDriver for TokioTimerDriver {
    fn arm(&mut self, token: TimerToken, schedule: TimerSchedule) {
        let tx = self.tx.clone();
        let handle = match schedule {
            TimerSchedule::Every(period) => tokio::spawn(async move {
                let mut ticker = time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    if tx.send(token).is_err() {
                        break;
                    }
                }
            }),
            TimerSchedule::After(delay) => tokio::spawn(async move {
                time::sleep(delay).await;
                let _ = tx.send(token);
            }),
        };

        let scoped = self.handles.entry(token.kind.scope()).or_default();
        scoped.retain(|handle| !handle.is_finished());
        scoped.push(handle);
    }

    fn cancel(&mut self, scope: TimerScope) {
        if let Some(handles) = self.handles.remove(&scope) {
            for handle in handles {
                handle.abort();
            }
        }
    }
}

impl Drop for TokioTimerDriver {
    fn drop(&mut self) {
        for handle in self.handles.drain().flat_map(|(_, handles)| handles) {
            handle.abort();
        }
    }
}

/// One timer a `ManualTimerDriver` currently considers live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub token: TimerToken,
    pub schedule: TimerSchedule,
}

/// Records armed timers instead of running them; tests fire tokens by hand.
///
/// Clones share state, so a test can keep one handle while the engine owns another.
#[derive(Clone, Default)]
pub struct ManualTimerDriver {
    live: Arc<Mutex<Vec<ArmedTimer>>>,
}

impl ManualTimerDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn live(&self) -> Vec<ArmedTimer> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recently armed live token of `kind`.
    #[must_use]
    pub fn token(&self, kind: TimerKind) -> Option<TimerToken> {
        self.live()
            .into_iter()
            .rev()
            .find(|armed| armed.token.kind == kind)
            .map(|armed| armed.token)
    }

    #[must_use]
    pub fn count(&self, kind: TimerKind) -> usize {
        self.live()
            .iter()
            .filter(|armed| armed.token.kind == kind)
            .count()
    }
}

impl TimerDriver for ManualTimerDriver {
    fn arm(&mut self, token: TimerToken, schedule: TimerSchedule) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ArmedTimer { token, schedule });
    }

    fn cancel(&mut self, scope: TimerScope) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|armed| armed.token.kind.scope() != scope);
    }
}
