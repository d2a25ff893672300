//! # Composer Component
//!
//! The message box at the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Multi-line text editing (Enter submits, Shift+Enter breaks the line)
//! - Holding at most one pending image attachment
//! - Attaching by path prompt (Ctrl+O) or by dropping a file on the terminal
//! - Showing why an attachment was refused
//!
//! ## Drops
//!
//! Terminals deliver a dragged-in file as a bracketed paste of its path,
//! sometimes quoted, shell-escaped, or as a `file://` URL. A paste that is a
//! single path to an existing file is treated as a drop; anything else is
//! ordinary text.
//!
//! ## State Management
//!
//! The buffer, attachment slot and notice are internal state. `is_loading`
//! is a prop from the application state.

mod layout;

use std::path::PathBuf;

use log::{debug, info};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::attachment::Attachment;
use crate::core::config::expand_home;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, inner_width, locate, move_vertically,
    next_char_boundary, prev_char_boundary, rows, scroll_for,
};

/// High-level events emitted by the Composer
#[derive(Debug)]
pub enum ComposerEvent {
    /// Enter pressed with text and/or an image ready
    Submit {
        text: String,
        attachment: Option<Attachment>,
    },
    /// An image was attached or removed
    AttachmentChanged,
    /// A file was refused; the reason is in `notice`
    Rejected,
    ContentChanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComposerMode {
    /// Editing the message
    Message,
    /// Typing a path to attach (Ctrl+O)
    AttachPath,
}

pub struct Composer {
    /// Message text (Internal State)
    pub buffer: String,
    /// The single pending image
    pub attachment: Option<Attachment>,
    /// Why the last attachment attempt failed
    pub notice: Option<String>,
    pub mode: ComposerMode,
    /// Whether a reply is outstanding (Prop)
    pub is_loading: bool,
    path_buffer: String,
    /// Byte offset into `buffer`
    cursor: usize,
    scroll_offset: u16,
    last_inner_width: u16,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            attachment: None,
            notice: None,
            mode: ComposerMode::Message,
            is_loading: false,
            path_buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            last_inner_width: 0,
        }
    }

    /// Height needed for the current content at the given width, including
    /// the attachment and notice rows above the box.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let text_rows = match self.mode {
            ComposerMode::Message => {
                (rows(&self.buffer, inner_width(width)).len() as u16).min(MAX_VISIBLE_LINES)
            }
            ComposerMode::AttachPath => 1,
        };
        self.header_rows() + text_rows + VERTICAL_OVERHEAD
    }

    fn header_rows(&self) -> u16 {
        u16::from(self.attachment.is_some()) + u16::from(self.notice.is_some())
    }

    /// Try to attach the file at `path`. A refusal leaves any existing
    /// attachment in place and sets the notice.
    pub fn attach_path(&mut self, path: PathBuf) -> ComposerEvent {
        match Attachment::from_path(&path) {
            Ok(attachment) => {
                info!("Attached {}", attachment.name());
                self.attachment = Some(attachment);
                self.notice = None;
                ComposerEvent::AttachmentChanged
            }
            Err(e) => {
                debug!("Refused attachment {}: {}", path.display(), e);
                self.notice = Some(e.to_string());
                ComposerEvent::Rejected
            }
        }
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
        self.notice = None;
    }

    fn handle_path_event(&mut self, event: &TuiEvent) -> Option<ComposerEvent> {
        match event {
            TuiEvent::InputChar('\n') => None,
            TuiEvent::InputChar(c) => {
                self.path_buffer.push(*c);
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.path_buffer.push_str(text.trim());
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Backspace => self
                .path_buffer
                .pop()
                .map(|_| ComposerEvent::ContentChanged),
            TuiEvent::Submit => {
                self.mode = ComposerMode::Message;
                let raw = std::mem::take(&mut self.path_buffer);
                let path = clean_path(&raw)?;
                Some(self.attach_path(path))
            }
            TuiEvent::Escape => {
                self.mode = ComposerMode::Message;
                self.path_buffer.clear();
                Some(ComposerEvent::ContentChanged)
            }
            _ => None,
        }
    }

    fn handle_message_event(&mut self, event: &TuiEvent) -> Option<ComposerEvent> {
        match event {
            TuiEvent::OpenAttach => {
                self.mode = ComposerMode::AttachPath;
                self.notice = None;
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::RemoveAttachment => {
                self.notice = None;
                self.attachment
                    .take()
                    .map(|_| ComposerEvent::AttachmentChanged)
            }
            TuiEvent::Submit => {
                if self.is_loading || (self.buffer.trim().is_empty() && self.attachment.is_none())
                {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll_offset = 0;
                self.notice = None;
                Some(ComposerEvent::Submit {
                    text,
                    attachment: self.attachment.take(),
                })
            }
            TuiEvent::Paste(text) => match dropped_path(text) {
                Some(path) => Some(self.attach_path(path)),
                None => {
                    self.insert_str(text);
                    Some(ComposerEvent::ContentChanged)
                }
            },
            TuiEvent::InputChar(c) => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                self.notice = None;
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return None;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                self.notice = None;
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                ComposerEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                ComposerEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                (self.cursor != line_start).then(|| {
                    self.cursor = line_start;
                    ComposerEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                (self.cursor != line_end).then(|| {
                    self.cursor = line_end;
                    ComposerEvent::ContentChanged
                })
            }
            // `None` at the first/last row lets the parent scroll the list instead
            TuiEvent::CursorUp | TuiEvent::CursorDown => {
                let delta = if *event == TuiEvent::CursorUp { -1 } else { 1 };
                let moved =
                    move_vertically(&self.buffer, self.cursor, delta, self.last_inner_width)?;
                self.cursor = moved;
                Some(ComposerEvent::ContentChanged)
            }
            TuiEvent::Escape => self.notice.take().map(|_| ComposerEvent::ContentChanged),
            _ => None,
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        if let Some(attachment) = &self.attachment {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" ▣ {} · {}", attachment.name(), attachment.mime_type()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled("  Ctrl+X remove", Style::default().fg(Color::DarkGray)),
            ]));
        }
        if let Some(notice) = &self.notice {
            lines.push(Line::from(Span::styled(
                format!(" ⚠ {notice}"),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_message_box(&mut self, frame: &mut Frame, area: Rect) {
        self.last_inner_width = inner_width(area.width);
        let text_rows = rows(&self.buffer, self.last_inner_width);
        let (cursor_row, cursor_col) = locate(&self.buffer, &text_rows, self.cursor);
        self.scroll_offset = scroll_for(cursor_row, self.scroll_offset);

        let title = if self.is_loading {
            "Message (waiting for reply)"
        } else {
            "Message"
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .title_bottom(
                Line::from(Span::styled(
                    " Enter send · Shift+Enter newline · Ctrl+O attach ",
                    Style::default().fg(Color::DarkGray),
                ))
                .right_aligned(),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.buffer.is_empty() {
            let placeholder = if self.attachment.is_some() {
                "Describe what to segment in this image..."
            } else {
                "Type a message, or drop an image here..."
            };
            frame.render_widget(
                Paragraph::new(placeholder).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                inner,
            );
        } else {
            let visible: Vec<Line> = text_rows
                .iter()
                .skip(usize::from(self.scroll_offset))
                .take(usize::from(MAX_VISIBLE_LINES))
                .map(|r| Line::from(&self.buffer[r.start..r.end]))
                .collect();
            frame.render_widget(
                Paragraph::new(visible).style(Style::default().fg(Color::Green)),
                inner,
            );
        }

        self.render_scrollbar(frame, area, text_rows.len() as u16);

        let x = inner.x + cursor_col.min(inner.width.saturating_sub(1));
        let y = inner.y + (cursor_row as u16).saturating_sub(self.scroll_offset);
        frame.set_cursor_position((x, y));
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, total_rows: u16) {
        use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

        if total_rows <= MAX_VISIBLE_LINES {
            return;
        }
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(usize::from(total_rows - MAX_VISIBLE_LINES))
            .position(usize::from(self.scroll_offset));
        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }

    fn render_path_box(&self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title("Attach image: path (Enter confirm, Esc cancel)");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(self.path_buffer.as_str()), inner);

        let col = self.path_buffer.width() as u16;
        frame.set_cursor_position((inner.x + col.min(inner.width.saturating_sub(1)), inner.y));
    }
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [header_area, box_area] =
            Layout::vertical([Constraint::Length(self.header_rows()), Constraint::Min(0)])
                .areas(area);
        self.render_header(frame, header_area);
        match self.mode {
            ComposerMode::Message => self.render_message_box(frame, box_area),
            ComposerMode::AttachPath => self.render_path_box(frame, box_area),
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match self.mode {
            ComposerMode::Message => self.handle_message_event(event),
            ComposerMode::AttachPath => self.handle_path_event(event),
        }
    }
}

/// Normalises a typed or pasted path: trims, unquotes, strips `file://`,
/// undoes shell escaping of spaces and expands `~/`.
fn clean_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);
    let path = unquoted.strip_prefix("file://").unwrap_or(unquoted);
    let path = path.replace("\\ ", " ");
    if path.is_empty() {
        return None;
    }
    Some(expand_home(&path))
}

/// Recognises a paste that is really a file dragged onto the terminal.
fn dropped_path(pasted: &str) -> Option<PathBuf> {
    if pasted.trim().contains('\n') {
        return None;
    }
    clean_path(pasted).filter(|p| p.is_file())
}
