//! Interactive session
//!
//! One loop owns all UI state. It waits on two sources at once:
//!
//! ```text
//! terminal thread ──TuiEvent──┐
//!                             ├──> select! ──> SessionState ──> view
//! JoinSet<Completion> ────────┘
//! ```
//!
//! Submissions run as tasks in a `JoinSet`, so typing continues while a post
//! is in flight. Completions are recorded in arrival order, which is not
//! necessarily submission order. On quit every task still running is
//! cancelled and reaped before the loop returns, so nothing writes to the
//! diary after the session has ended.

mod events;
pub mod state;
mod terminal;
pub mod view;

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use events::TuiEvent;
pub use state::{Action, Completion, HistoryLine, SessionState};

use crate::core::reconcile::Reconciler;
use terminal::TerminalManager;

/// How often the terminal thread checks for shutdown
const POLL_TICK: Duration = Duration::from_millis(100);

/// Run the interactive session on the real terminal until the user quits.
pub async fn run(reconciler: Reconciler, history_limit: usize) -> Result<()> {
    let mut terminal = TerminalManager::new()?;

    let (tx, rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let reader = events::spawn_reader(tx, shutdown.clone(), POLL_TICK);

    let mut state = SessionState::new(history_limit);
    let result = drive(
        &mut state,
        rx,
        reconciler,
        || Local::now().naive_local(),
        |state| {
            terminal
                .terminal_mut()
                .draw(|frame| view::render(frame, state))?;
            Ok(())
        },
    )
    .await;

    shutdown.cancel();
    drop(terminal);
    if reader.join().is_err() {
        warn!("terminal reader thread panicked");
    }

    result
}

/// The session loop, independent of the real terminal.
///
/// `clock` stamps each submission when it is made; `draw` is called once up
/// front and after every handled event.
pub async fn drive<C, D>(
    state: &mut SessionState,
    mut events: UnboundedReceiver<TuiEvent>,
    reconciler: Reconciler,
    clock: C,
    mut draw: D,
) -> Result<()>
where
    C: Fn() -> NaiveDateTime,
    D: FnMut(&SessionState) -> Result<()>,
{
    let cancel = CancellationToken::new();
    let mut tasks: JoinSet<Option<Completion>> = JoinSet::new();

    draw(state)?;

    let result = loop {
        if state.is_quitting() {
            break Ok(());
        }

        tokio::select! {
            event = events.recv() => match event {
                Some(TuiEvent::Key(key)) => {
                    if let Action::Submit(message) = state.handle_key(key) {
                        let now = clock();
                        debug!(%message, "dispatching submission");
                        tasks.spawn(submit(reconciler.clone(), cancel.clone(), now, message));
                    }
                }
                Some(TuiEvent::Resize(..)) => {}
                Some(TuiEvent::Failed(e)) => break Err(anyhow::anyhow!("terminal input failed: {}", e)),
                None => state.quit(),
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                Ok(Some(done)) => state.handle_completion(done),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "submission task failed");
                    state.record(HistoryLine::Failed {
                        message: String::new(),
                        error: e.to_string(),
                    });
                }
            },
        }

        if let Err(e) = draw(state) {
            break Err(e);
        }
    };

    if !tasks.is_empty() {
        info!(in_flight = tasks.len(), "cancelling in-flight submissions");
    }
    cancel.cancel();
    while tasks.join_next().await.is_some() {}

    result
}

/// Background unit of work for one submission. `None` means it was cancelled.
async fn submit(
    reconciler: Reconciler,
    cancel: CancellationToken,
    now: NaiveDateTime,
    message: String,
) -> Option<Completion> {
    let result = tokio::select! {
        _ = cancel.cancelled() => return None,
        result = reconciler.handle_post(now, &message) => result,
    };

    if let Err(e) = &result {
        warn!(%message, error = %e, "submission failed");
    }
    Some(Completion { message, result })
}
