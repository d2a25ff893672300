//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the messages (props).
//! Since `Component::render` takes `&mut self`, the layout cache and scroll
//! state are updated during the render pass, like a `StatefulWidget`.
//!
//! Messages are immutable once appended, so cached heights stay valid until
//! the width changes.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageBubble;
use crate::tui::event::TuiEvent;

/// Blank rows below each bubble.
const MESSAGE_GAP: u16 = 1;
/// Rows reserved under the last bubble for the waiting indicator.
const LOADING_ROWS: u16 = 2;
const LOADING_DOTS: usize = 3;

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Whether content exists below the visible window.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_offset()
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [Message],
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            spinner_frame,
        }
    }

    fn loading_line(&self) -> Line<'static> {
        let lit = self.spinner_frame % LOADING_DOTS;
        let dots: Vec<Span> = (0..LOADING_DOTS)
            .flat_map(|i| {
                let style = if i == lit {
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                [Span::styled("●", style), Span::raw(" ")]
            })
            .collect();
        Line::from(dots).alignment(Alignment::Left)
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Update Layout Cache
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.messages.len(), content_width);
        layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(MessageBubble::calculate_height(message, content_width) + MESSAGE_GAP);
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(self.messages.len(), content_width);

        let total_height = self.state.layout.total_height();
        let loading_rows = if self.is_loading { LOADING_ROWS } else { 0 };
        let canvas_height = total_height + loading_rows;

        // 2. Clamp
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible bubbles into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let top = self.state.layout.top_of(i);
            let height = self.state.layout.heights[i].saturating_sub(MESSAGE_GAP);
            let row = Rect::new(0, top, content_width, height);
            let message = &self.messages[i];
            scroll_view.render_widget(
                MessageBubble::new(message),
                MessageBubble::placement(message, row),
            );
        }

        if self.is_loading {
            let row = Rect::new(1, total_height, content_width.saturating_sub(1), 1);
            scroll_view.render_widget(Paragraph::new(self.loading_line()), row);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on `MessageListState` because `MessageList` is
/// recreated every frame and can't hold scroll position.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => {
                self.stick_to_bottom = true;
                self.scroll_state.scroll_to_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached per-message heights (bubble plus gap).
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
        }
    }

    /// How many cached heights are still valid.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Y coordinate where message `index` starts.
    pub fn top_of(&self, index: usize) -> u16 {
        if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        }
    }

    /// Messages intersecting the viewport, padded by half a screen each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(state: &mut MessageListState, messages: &[Message], loading: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(state, messages, loading, 0).render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![4; 5];
        cache.update_metadata(5, 80);

        assert_eq!(cache.reusable_count(5, 80), 5);
        // A new message keeps every old height
        assert_eq!(cache.reusable_count(6, 80), 5);
        // Width change invalidates everything
        assert_eq!(cache.reusable_count(5, 40), 0);
        // Fewer messages than cached means a different conversation
        assert_eq!(cache.reusable_count(3, 80), 0);
    }

    #[test]
    fn test_prefix_heights_and_visible_range() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![4, 4, 4, 4, 4];
        cache.rebuild_prefix_heights();

        assert_eq!(cache.prefix_heights, vec![4, 8, 12, 16, 20]);
        assert_eq!(cache.total_height(), 20);
        assert_eq!(cache.top_of(0), 0);
        assert_eq!(cache.top_of(3), 12);

        // Viewport of 4 rows at offset 8, padded by 2 each way: rows 6..14
        assert_eq!(cache.visible_range(8, 4), 1..4);
        assert_eq!(cache.visible_range(0, 40), 0..5);
    }

    #[test]
    fn test_renders_messages_in_order() {
        let mut state = MessageListState::new();
        let messages = vec![
            Message::user("first question", None),
            Message::model("first answer".into(), None),
        ];
        let text = render_text(&mut state, &messages, false);

        let q = text.find("first question").unwrap();
        let a = text.find("first answer").unwrap();
        assert!(q < a);
        assert_eq!(state.layout.heights.len(), 2);
    }

    #[test]
    fn test_loading_indicator_only_while_loading() {
        let messages = vec![Message::user("hello", None)];

        let mut state = MessageListState::new();
        assert!(render_text(&mut state, &messages, true).contains('●'));

        let mut state = MessageListState::new();
        assert!(!render_text(&mut state, &messages, false).contains('●'));
    }

    #[test]
    fn test_scroll_up_unpins_and_scroll_to_bottom_repins() {
        let mut state = MessageListState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        state.handle_event(&TuiEvent::ScrollToBottom);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_unseen_content_when_scrolled_up() {
        let mut state = MessageListState::new();
        let messages: Vec<Message> = (0..10)
            .map(|i| Message::user(&format!("message {i}"), None))
            .collect();
        render_text(&mut state, &messages, false);
        assert!(!state.has_unseen_content());

        // 10 bubbles of 4 rows in a 20 row viewport
        state.stick_to_bottom = false;
        state.scroll_state.set_offset(Position { x: 0, y: 0 });
        assert!(state.has_unseen_content());

        state.scroll_state.set_offset(Position { x: 0, y: 20 });
        assert!(!state.has_unseen_content());
    }
}
