use geoquiz_core::clock::TimerToken;
use tokio::sync::mpsc;

use super::engine::{SessionEngine, UserIntent};

/// Feed intents and timer tokens into `engine` one at a time until the intent
/// channel closes or `Shutdown` arrives. Every timer is cancelled on exit.
pub async fn run_session(
    engine: &mut SessionEngine,
    mut intents: mpsc::Receiver<UserIntent>,
    mut timers: mpsc::UnboundedReceiver<TimerToken>,
) {
    if let Err(err) = engine.init().await {
        tracing::warn!(%err, "quiz failed to load, waiting for retry");
    }

    loop {
        tokio::select! {
            intent = intents.recv() => match intent {
                None | Some(UserIntent::Shutdown) => break,
                Some(intent) => {
                    if let Err(err) = engine.dispatch(intent).await {
                        tracing::warn!(%err, "intent failed");
                    }
                }
            },
            Some(token) = timers.recv() => engine.on_timer(token).await,
        }
    }

    engine.shutdown();
    tracing::info!(variant = %engine.variant(), "session runner stopped");
}
