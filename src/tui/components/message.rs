use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::core::message::{Message, Role};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Bubbles never shrink below this width unless the terminal does.
const MIN_BUBBLE_WIDTH: u16 = 24;

/// A single chat bubble.
///
/// User bubbles sit on the right and model bubbles on the left, like a
/// messenger. A bubble stacks, top to bottom: the attachment line, the save
/// hint for returned images, then the wrapped text. The send time sits in the
/// bottom border.
///
/// Height is predicted with `textwrap` and the same wrapped lines are what
/// gets drawn, so [`calculate_height`](Self::calculate_height) and the
/// rendered result always agree.
#[derive(Clone, Copy)]
pub struct MessageBubble<'a> {
    pub message: &'a Message,
}

impl<'a> MessageBubble<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    /// Width of a bubble inside a list of the given width (three quarters).
    pub fn bubble_width(list_width: u16) -> u16 {
        (list_width.saturating_mul(3) / 4)
            .max(MIN_BUBBLE_WIDTH)
            .min(list_width)
    }

    /// Where the bubble goes within a row of the list.
    pub fn placement(message: &Message, row: Rect) -> Rect {
        let width = Self::bubble_width(row.width);
        let x = match message.role() {
            Role::User => row.x + row.width.saturating_sub(width),
            Role::Model => row.x,
        };
        Rect::new(x, row.y, width, row.height)
    }

    /// Height of the bubble when the list is `list_width` wide.
    pub fn calculate_height(message: &Message, list_width: u16) -> u16 {
        let content_width = Self::bubble_width(list_width).saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        (Self::body_lines(message, content_width).len() as u16).max(1) + VERTICAL_OVERHEAD
    }

    fn accent(message: &Message) -> Color {
        if message.is_error() {
            return Color::Red;
        }
        match message.role() {
            Role::User => Color::Green,
            Role::Model => Color::Blue,
        }
    }

    fn body_lines(message: &Message, content_width: u16) -> Vec<Line<'static>> {
        let width = content_width as usize;
        let options = textwrap::Options::new(width)
            .break_words(true)
            .word_separator(textwrap::WordSeparator::AsciiSpace);
        let mut lines = Vec::new();

        if let Some(attachment) = message.attachment() {
            let label = format!("▣ {} · {}", attachment.name(), attachment.mime_type());
            for piece in textwrap::wrap(&label, &options) {
                lines.push(Line::from(Span::styled(
                    piece.into_owned(),
                    Style::default().fg(Color::Cyan),
                )));
            }

            if message.role() == Role::Model {
                let mut hint = String::from("↓ Ctrl+S save");
                if let Some(path) = attachment.preview_path() {
                    hint.push_str(&format!(" · {}", path.display()));
                }
                for piece in textwrap::wrap(&hint, &options) {
                    lines.push(Line::from(Span::styled(
                        piece.into_owned(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
            }
        }

        if let Some(text) = message.text() {
            let style = if message.is_error() {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            for raw in text.lines() {
                if raw.trim().is_empty() {
                    lines.push(Line::default());
                    continue;
                }
                for piece in textwrap::wrap(raw, &options) {
                    lines.push(Line::from(Span::styled(piece.into_owned(), style)));
                }
            }
        }

        lines
    }
}

impl<'a> Widget for MessageBubble<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let accent = Self::accent(self.message);
        let border_style = Style::default().fg(accent);
        let title = if self.message.is_error() {
            String::from("⚠ Error")
        } else {
            self.message.role().label().to_string()
        };
        let time = self.message.timestamp().format("%H:%M").to_string();

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style.add_modifier(Modifier::BOLD))
            .title_bottom(
                Line::from(Span::styled(time, Style::default().fg(Color::DarkGray)))
                    .alignment(Alignment::Right),
            )
            .padding(Padding::horizontal(CONTENT_PAD_H));
        block = match self.message.role() {
            Role::User => block.title(Line::from(title).alignment(Alignment::Right)),
            Role::Model => block.title(title),
        };

        let inner_area = block.inner(area);
        block.render(area, buf);

        let lines = Self::body_lines(self.message, inner_area.width);
        Paragraph::new(lines).render(inner_area, buf);
    }
}

impl<'a> Component for MessageBubble<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attachment::Attachment;
    use crate::test_support::png_attachment;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(message: &Message, width: u16) -> (String, Rect) {
        let height = MessageBubble::calculate_height(message, width);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut placed = Rect::default();
        terminal
            .draw(|f| {
                placed = MessageBubble::placement(message, f.area());
                Component::render(&mut MessageBubble::new(message), f, placed);
            })
            .unwrap();
        let text = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        (text, placed)
    }

    #[test]
    fn test_bubble_width_is_three_quarters_with_floor() {
        assert_eq!(MessageBubble::bubble_width(80), 60);
        assert_eq!(MessageBubble::bubble_width(28), 24);
        assert_eq!(MessageBubble::bubble_width(10), 10);
    }

    #[test]
    fn test_height_of_short_text() {
        let message = Message::user("hello", None);
        assert_eq!(MessageBubble::calculate_height(&message, 80), 3);
    }

    #[test]
    fn test_height_counts_wrapping_and_attachment_line() {
        // 60 wide bubble leaves 56 columns for text
        let long = "word ".repeat(20);
        let message = Message::user(&long, Some(png_attachment()));
        assert_eq!(MessageBubble::calculate_height(&message, 80), 1 + 2 + 2);
    }

    #[test]
    fn test_model_image_adds_save_hint() {
        let message = Message::model(
            "done".into(),
            Some(Attachment::from_bytes(vec![1, 2], "image/png")),
        );
        // attachment line + hint line + text line
        assert_eq!(MessageBubble::calculate_height(&message, 80), 3 + 2);
        let (text, _) = draw(&message, 80);
        assert!(text.contains("segmented.png"));
        assert!(text.contains("Ctrl+S save"));
    }

    #[test]
    fn test_degenerate_width() {
        let message = Message::user("hi", None);
        assert_eq!(MessageBubble::calculate_height(&message, 3), 1);
    }

    #[test]
    fn test_user_bubble_is_right_aligned() {
        let message = Message::user("hello", None);
        let (text, placed) = draw(&message, 80);
        assert_eq!(placed.x, 20);
        assert!(text.contains("hello"));
        assert!(text.contains("you"));
    }

    #[test]
    fn test_model_bubble_is_left_aligned() {
        let message = Message::model("hi there".into(), None);
        let (text, placed) = draw(&message, 80);
        assert_eq!(placed.x, 0);
        assert!(text.contains("segment"));
        assert!(text.contains("hi there"));
    }

    #[test]
    fn test_error_bubble_is_flagged() {
        let message = Message::send_error();
        let (text, _) = draw(&message, 80);
        assert!(text.contains("⚠ Error"));
        assert_eq!(MessageBubble::accent(&message), Color::Red);
    }

    #[test]
    fn test_bubble_shows_time() {
        let message = Message::user("hello", None);
        let expected = message.timestamp().format("%H:%M").to_string();
        let (text, _) = draw(&message, 80);
        assert!(text.contains(&expected));
    }
}
