use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{LandingPage, MessageList, TitleBar};

/// Lay out and draw the whole screen: title bar, conversation, composer.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let composer_height = tui.composer.calculate_height(frame.area().width);
    let [title_area, main_area, composer_area] =
        Layout::vertical([Length(1), Min(0), Length(composer_height)]).areas(frame.area());

    let mut title_bar = TitleBar::new(
        app.endpoint.clone(),
        app.status_message.clone(),
        tui.message_list.has_unseen_content(),
    );
    title_bar.render(frame, title_area);

    let messages = app.conversation.messages();
    if messages.is_empty() && !app.is_loading() {
        LandingPage.render(frame, main_area);
    } else {
        MessageList::new(&mut tui.message_list, messages, app.is_loading(), spinner_frame)
            .render(frame, main_area);
    }

    tui.composer.render(frame, composer_area);
}
