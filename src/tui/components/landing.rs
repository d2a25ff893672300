//! # Landing Page Component
//!
//! Shown in place of the message list while the conversation is empty.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

const HINTS: [(&str, &str); 4] = [
    ("Enter", "send"),
    ("Shift+Enter", "new line"),
    ("Ctrl+O", "attach an image"),
    ("Ctrl+C", "quit"),
];

pub struct LandingPage;

impl LandingPage {
    fn lines() -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Welcome to Segment Chat",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Send a picture and describe what to segment.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Drop an image file onto the terminal to attach it.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
        ];
        for (key, what) in HINTS {
            lines.push(Line::from(vec![
                Span::styled(key, Style::default().fg(Color::Cyan)),
                Span::styled(format!("  {what}"), Style::default().fg(Color::DarkGray)),
            ]));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }
}

impl Component for LandingPage {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = Self::lines();
        let [text_area] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_landing_shows_welcome_and_hints() {
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        terminal
            .draw(|f| LandingPage.render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();

        assert!(text.contains("Welcome to Segment Chat"));
        assert!(text.contains("Ctrl+O"));
        assert!(text.contains("attach an image"));
    }
}
