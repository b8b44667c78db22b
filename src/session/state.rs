//! Session state machine
//!
//! Pure state: no terminal, no network. The loop in `session::drive` feeds it
//! key events and completion events and acts on the returned `Action`.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::Style;
use tui_textarea::TextArea;

use crate::core::history::History;
use crate::core::reconcile::PostOutcome;
use crate::error::ReconcileError;

/// Maximum characters accepted in the input line
pub const INPUT_LIMIT: usize = 500;

const QUIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

/// What the loop should do after a key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Post this (trimmed) message in the background
    Submit(String),
    Quit,
}

/// Result of one background submission
#[derive(Debug)]
pub struct Completion {
    pub message: String,
    pub result: Result<PostOutcome, ReconcileError>,
}

/// One line of the on-screen history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLine {
    Posted { message: String, created: bool },
    Failed { message: String, error: String },
}

impl HistoryLine {
    pub fn is_success(&self) -> bool {
        matches!(self, HistoryLine::Posted { .. })
    }
}

impl From<Completion> for HistoryLine {
    fn from(done: Completion) -> Self {
        match done.result {
            Ok(outcome) => HistoryLine::Posted {
                message: done.message,
                created: outcome.created(),
            },
            Err(e) => HistoryLine::Failed {
                message: done.message,
                error: e.to_string(),
            },
        }
    }
}

impl fmt::Display for HistoryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryLine::Posted { message, created } => {
                write!(f, "✅ posted: {}", message)?;
                if *created {
                    write!(f, " (new article)")?;
                }
                Ok(())
            }
            HistoryLine::Failed { error, .. } => write!(f, "❌ error: {}", error),
        }
    }
}

/// Single-line prompt: the text area's own keymap handles editing, with
/// newlines and anything past `INPUT_LIMIT` undone.
fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(Style::default());
    input
}

fn input_len(input: &TextArea<'_>) -> usize {
    input.lines().iter().map(|line| line.chars().count()).sum()
}

/// Windows reports AltGr as Ctrl+Alt; such characters are plain text.
fn normalize_altgr(mut key: KeyEvent) -> KeyEvent {
    let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
    if matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(altgr) {
        key.modifiers.remove(altgr);
    }
    key
}

/// Everything the view needs to draw one frame
pub struct SessionState {
    input: TextArea<'static>,
    history: History<HistoryLine>,
    quitting: bool,
    in_flight: usize,
}

impl SessionState {
    pub fn new(history_limit: usize) -> Self {
        Self {
            input: new_input(),
            history: History::new(history_limit),
            quitting: false,
            in_flight: 0,
        }
    }

    pub fn input(&self) -> &TextArea<'static> {
        &self.input
    }

    /// Current prompt text
    pub fn input_text(&self) -> String {
        self.input.lines().join("")
    }

    pub fn history(&self) -> &History<HistoryLine> {
        &self.history
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// Submissions dispatched but not yet completed
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Enter the terminal state
    pub fn quit(&mut self) {
        self.quitting = true;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.quitting || key.kind == KeyEventKind::Release {
            return Action::None;
        }

        let key = normalize_altgr(key);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.quit();
                Action::Quit
            }
            KeyCode::Esc => {
                self.quit();
                Action::Quit
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char('m') | KeyCode::Char('j') if ctrl => self.submit(),
            _ => {
                self.edit(key);
                Action::None
            }
        }
    }

    fn edit(&mut self, key: KeyEvent) {
        if !self.input.input(key) {
            return;
        }
        if self.input.lines().len() > 1 || input_len(&self.input) > INPUT_LIMIT {
            self.input.undo();
        }
    }

    fn submit(&mut self) -> Action {
        let value = self.input_text();
        let message = value.trim();
        if message.is_empty() {
            return Action::None;
        }

        if is_quit_word(message) {
            self.quit();
            return Action::Quit;
        }

        let message = message.to_string();
        self.input = new_input();
        self.in_flight += 1;
        Action::Submit(message)
    }

    /// Fold a finished submission into the history
    pub fn handle_completion(&mut self, done: Completion) {
        self.record(done.into());
    }

    /// Record an outcome that did not come from a normal completion
    pub fn record(&mut self, line: HistoryLine) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.history.push(line);
    }
}

fn is_quit_word(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUIT_WORDS.contains(&lower.as_str())
}
