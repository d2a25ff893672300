//! # Actions
//!
//! Everything that can happen in Segment Chat becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The service answers? That's `Action::ReplyReceived(reply)`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing any I/O the caller must perform.
//! No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::path::PathBuf;

use log::{debug, warn};

use crate::core::attachment::Attachment;
use crate::core::pipeline::{self, SendOutcome};
use crate::core::state::App;
use crate::transport::{Reply, TransportError};

#[derive(Debug)]
pub enum Action {
    /// The composer submitted text and/or an image.
    Submit {
        text: String,
        attachment: Option<Attachment>,
    },
    ReplyReceived(Reply),
    ReplyFailed(TransportError),
    /// Save the newest model image (the download affordance).
    SaveLatestImage,
    Quit,
}

#[derive(Debug)]
pub enum Effect {
    None,
    /// Run the transport call for the send that just began.
    SpawnRequest {
        prompt: String,
        attachment: Option<Attachment>,
    },
    SaveImage {
        image: Attachment,
        dir: PathBuf,
    },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit { text, attachment } => {
            if app.is_loading() {
                app.status_message = String::from("Still waiting for the last reply");
                return Effect::None;
            }
            match pipeline::begin_send(&mut app.conversation, &text, attachment) {
                Some(pending) => {
                    let effect = Effect::SpawnRequest {
                        prompt: pending.prompt().to_string(),
                        attachment: pending.attachment().cloned(),
                    };
                    app.pending = Some(pending);
                    app.status_message = String::from("Segmenting...");
                    effect
                }
                None => Effect::None,
            }
        }
        Action::ReplyReceived(reply) => finish(app, Ok(reply)),
        Action::ReplyFailed(error) => finish(app, Err(error)),
        Action::SaveLatestImage => match app.conversation.last_model_image() {
            Some(image) => Effect::SaveImage {
                image: image.clone(),
                dir: app.download_dir.clone(),
            },
            None => {
                app.status_message = String::from("No returned image to save");
                Effect::None
            }
        },
        Action::Quit => Effect::Quit,
    }
}

fn finish(app: &mut App, result: Result<Reply, TransportError>) -> Effect {
    let Some(pending) = app.pending.take() else {
        warn!("Reply arrived with no send in flight; dropping it");
        return Effect::None;
    };
    let outcome = pipeline::finish_send(&mut app.conversation, pending, result);
    debug!("Send outcome: {:?}", outcome);
    app.status_message = match outcome {
        SendOutcome::Failed => String::from("Request failed"),
        _ => String::from("Ready"),
    };
    Effect::None
}
