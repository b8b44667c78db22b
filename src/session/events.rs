//! Terminal event source
//!
//! crossterm's reader is blocking, so a dedicated thread polls it and forwards
//! events into the async loop over a channel.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Events consumed by the session loop
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(KeyEvent),

    /// Window resize event
    Resize(u16, u16),

    /// The terminal could not be read; the loop cannot continue
    Failed(String),
}

/// Spawn the polling thread. It stops when `shutdown` is cancelled or the
/// receiver is dropped.
pub fn spawn_reader(
    tx: UnboundedSender<TuiEvent>,
    shutdown: CancellationToken,
    tick: Duration,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while !shutdown.is_cancelled() {
            let event = match event::poll(tick) {
                Ok(false) => continue,
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => TuiEvent::Key(key),
                    Ok(Event::Resize(w, h)) => TuiEvent::Resize(w, h),
                    Ok(_) => continue,
                    Err(e) => TuiEvent::Failed(e.to_string()),
                },
                Err(e) => TuiEvent::Failed(e.to_string()),
            };

            let failed = matches!(event, TuiEvent::Failed(_));
            if tx.send(event).is_err() || failed {
                break;
            }
        }
    })
}
