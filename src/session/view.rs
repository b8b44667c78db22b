//! Presentation layer
//!
//! Draws a `SessionState` snapshot; holds no state of its own.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
    Frame,
};

use super::state::{HistoryLine, SessionState};

const ACCENT: Color = Color::Rgb(0x7d, 0x56, 0xf4);
const BORDER: Color = Color::Rgb(0x87, 0x4b, 0xfd);
const SUCCESS: Color = Color::Rgb(0x04, 0xb5, 0x75);
const ERROR: Color = Color::Rgb(0xff, 0x5f, 0x87);
const HELP: Color = Color::Rgb(0x62, 0x62, 0x62);

const PROMPT: &str = "📝 > ";
const HELP_TEXT: &str = "Enter: post | Ctrl+C/Esc: quit | exit/quit/q: quit";

/// Render the whole screen
pub fn render(frame: &mut Frame, state: &SessionState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(
            " 🔥 esa diary ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .padding(Padding::new(2, 2, 1, 0));

    let area = frame.area();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(history(state, chunks[0].height), chunks[0]);
    render_prompt(frame, state, chunks[1]);
    frame.render_widget(help(state), chunks[2]);
}

fn history(state: &SessionState, height: u16) -> Paragraph<'static> {
    let mut lines = Vec::new();
    if !state.history().is_empty() {
        lines.push(Line::from(Span::styled(
            "📝 recent posts:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(state.history().iter().map(history_line));
    }

    // newest lines stay visible when the window is short
    let overflow = (lines.len() as u16).saturating_sub(height);
    Paragraph::new(lines).scroll((overflow, 0))
}

fn history_line(line: &HistoryLine) -> Line<'static> {
    let color = if line.is_success() { SUCCESS } else { ERROR };
    Line::from(Span::styled(
        line.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn render_prompt(frame: &mut Frame, state: &SessionState, area: Rect) {
    let prompt = Span::styled(
        PROMPT,
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    );
    let [label, input] =
        Layout::horizontal([Constraint::Length(prompt.width() as u16), Constraint::Min(1)])
            .areas(area);

    frame.render_widget(Paragraph::new(Line::from(prompt)), label);
    // the text area scrolls itself to keep its cursor in view
    frame.render_widget(state.input(), input);
}

fn help(state: &SessionState) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(HELP_TEXT, Style::default().fg(HELP))];
    if state.in_flight() > 0 {
        spans.push(Span::styled(
            format!(" | ⏳ {} posting", state.in_flight()),
            Style::default().fg(ACCENT),
        ));
    }
    Paragraph::new(Line::from(spans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconcile::PostOutcome;
    use crate::session::state::Completion;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(state: &SessionState) -> String {
        let backend = TestBackend::new(80, 16);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn type_str(state: &mut SessionState, text: &str) {
        for c in text.chars() {
            state.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_empty_screen() {
        let screen = draw(&SessionState::new(10));
        assert!(screen.contains("esa diary"));
        assert!(screen.contains("Enter: post"));
        assert!(!screen.contains("recent posts"));
    }

    #[test]
    fn test_shows_input_and_history() {
        let mut state = SessionState::new(10);
        state.handle_completion(Completion {
            message: "hello".to_string(),
            result: Ok(PostOutcome::Appended {
                full_name: "dairy/24/01/02/dairy".to_string(),
                number: 1,
            }),
        });
        type_str(&mut state, "draft");

        let screen = draw(&state);
        assert!(screen.contains("recent posts"));
        assert!(screen.contains("posted: hello"));
        assert!(screen.contains("draft"));
    }

    #[test]
    fn test_shows_pending_count() {
        let mut state = SessionState::new(10);
        type_str(&mut state, "one");
        state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let screen = draw(&state);
        assert!(screen.contains("1 posting"));
    }

    #[test]
    fn test_long_input_keeps_cursor_end_visible() {
        let mut state = SessionState::new(10);
        let text: String = std::iter::repeat('a').take(150).chain("TAIL".chars()).collect();
        type_str(&mut state, &text);

        let screen = draw(&state);
        assert!(screen.contains("TAIL"));
    }
}
