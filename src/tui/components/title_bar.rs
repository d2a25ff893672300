//! # TitleBar Component
//!
//! Top status bar: which endpoint the client talks to, the current status,
//! and a "↓ New" marker when the user has scrolled away from fresh replies.
//!
//! TitleBar is purely presentational. It receives everything as props and
//! keeps no state of its own:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(
//!     app.endpoint.clone(),
//!     app.status_message.clone(),
//!     tui.has_unseen_content,
//! );
//! title_bar.render(frame, area);
//! ```
//!
//! The title text degrades from most to least information:
//!
//! 1. `"Segment Chat (http://…/message) | Segmenting... | ↓ New"`
//! 2. `"Segment Chat (http://…/message) | Segmenting..."`
//! 3. `"Segment Chat (http://…/message)"`

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    /// Full URL requests are posted to
    pub endpoint: String,
    /// Transient status (e.g. "Segmenting...", "Saved …")
    pub status_message: String,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(endpoint: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            endpoint,
            status_message,
            has_unseen_content,
        }
    }

    fn title_text(&self) -> String {
        let mut text = format!("Segment Chat ({})", self.endpoint);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        if self.has_unseen_content {
            text.push_str(" | ↓ New");
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.title_text(),
            Style::default().fg(Color::Cyan),
        ));
        frame.render_widget(line, area);
    }
}
