//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Send Flow
//!
//! ```text
//! Enter ─▶ Composer ─▶ Action::Submit ─▶ update() ─▶ Effect::SpawnRequest
//!                                                          │
//!            update() ◀─ Action::ReplyReceived/Failed ◀── tokio task (transport)
//! ```
//!
//! The transport call runs on a tokio task and reports back over an
//! `mpsc` channel, so the screen keeps redrawing (and the composer keeps
//! accepting text) while a reply is outstanding.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (waiting for a reply): draws every ~80ms for the dots.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.
//!
//! A `SteadyBlock` cursor style is used because ratatui's
//! `set_cursor_position` resets the terminal's blink timer on every draw.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::path::Path;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, update};
use crate::core::attachment::Attachment;
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::transport::{ChatTransport, HttpTransport};
use crate::tui::component::EventHandler;
use crate::tui::components::{Composer, ComposerEvent, MessageListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub composer: Composer,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            composer: Composer::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets us tell Shift+Enter from Enter; terminals
        // without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let transport = Arc::new(HttpTransport::from_config(&config));
    info!("Posting to {}", transport.url());
    let mut app = App::from_config(transport, &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        tui.composer.is_loading = app.is_loading();
        let animating = app.is_loading();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 4.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain everything pending before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, event, &tx) {
                break 'main;
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(&mut app, effect, &tx) {
                break 'main;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

/// Route one terminal event. Returns true when the app should exit.
fn handle_event(app: &mut App, tui: &mut TuiState, event: TuiEvent, tx: &mpsc::Sender<Action>) -> bool {
    match event {
        TuiEvent::Resize => false,
        TuiEvent::ForceQuit => {
            let effect = update(app, Action::Quit);
            apply_effect(app, effect, tx)
        }
        TuiEvent::SaveImage => {
            let effect = update(app, Action::SaveLatestImage);
            apply_effect(app, effect, tx)
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::ScrollToBottom => {
            tui.message_list.handle_event(&event);
            false
        }
        _ => match tui.composer.handle_event(&event) {
            Some(ComposerEvent::Submit { text, attachment }) => {
                let effect = update(app, Action::Submit { text, attachment });
                // A fresh send always brings the newest bubble into view
                tui.message_list.stick_to_bottom = true;
                apply_effect(app, effect, tx)
            }
            Some(ComposerEvent::Rejected) => {
                app.status_message = String::from("Attachment refused");
                false
            }
            Some(ComposerEvent::AttachmentChanged) => {
                app.status_message = match &tui.composer.attachment {
                    Some(attachment) => format!("Attached {}", attachment.name()),
                    None => String::from("Attachment removed"),
                };
                false
            }
            Some(ComposerEvent::ContentChanged) => false,
            None => {
                // Arrow keys past the composer's first/last row scroll the conversation
                let scroll = match event {
                    TuiEvent::CursorUp => Some(TuiEvent::ScrollUp),
                    TuiEvent::CursorDown => Some(TuiEvent::ScrollDown),
                    _ => None,
                };
                if let Some(scroll) = scroll {
                    tui.message_list.handle_event(&scroll);
                }
                false
            }
        },
    }
}

/// Perform the I/O an effect asks for. Returns true on `Effect::Quit`.
fn apply_effect(app: &mut App, effect: Effect, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::SpawnRequest { prompt, attachment } => {
            spawn_request(app.transport.clone(), prompt, attachment, tx.clone());
            false
        }
        Effect::SaveImage { image, dir } => {
            save_image(app, &image, &dir);
            false
        }
        Effect::Quit => true,
    }
}

fn spawn_request(
    transport: Arc<dyn ChatTransport>,
    prompt: String,
    attachment: Option<Attachment>,
    tx: mpsc::Sender<Action>,
) {
    info!(
        "Spawning request via {} (attachment: {})",
        transport.name(),
        attachment.as_ref().map_or("none", |a| a.name())
    );
    tokio::spawn(async move {
        let action = match transport.request(&prompt, attachment.as_ref()).await {
            Ok(reply) => Action::ReplyReceived(reply),
            Err(e) => {
                warn!("Request failed: {}", e);
                Action::ReplyFailed(e)
            }
        };
        if tx.send(action).is_err() {
            warn!("Failed to deliver reply: receiver dropped");
        }
    });
}

fn save_image(app: &mut App, image: &Attachment, dir: &Path) {
    match image.save_to(dir) {
        Ok(path) => {
            info!("Saved image to {}", path.display());
            app.status_message = format!("Saved {}", path.display());
        }
        Err(e) => {
            warn!("Failed to save image to {}: {}", dir.display(), e);
            app.status_message = format!("Save failed: {}", e);
        }
    }
}
