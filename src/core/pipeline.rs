//! # Send Pipeline
//!
//! Turns one user send into store mutations around one remote call:
//!
//! ```text
//! begin_send ── append user msg ── loading = true ──► PendingSend
//!                                                        │
//!                              transport.request(...)  ◄─┘
//!                                        │
//! finish_send ◄── Ok(reply) / Err(e) ────┘
//!     └── append model msg (or error msg) ── loading = false
//! ```
//!
//! `PendingSend` is handed out by `begin_send` and consumed by `finish_send`,
//! so a started send is finished exactly once and loading is cleared exactly
//! once. The TUI runs the transport call on a spawned task between the two
//! halves; `send` composes them sequentially for headless use.

use log::{debug, info, warn};

use crate::core::attachment::Attachment;
use crate::core::conversation::Conversation;
use crate::core::message::Message;
use crate::transport::{ChatTransport, Reply, TransportError};

/// An in-flight send. Not `Clone`: only one finish per begin.
#[derive(Debug)]
pub struct PendingSend {
    prompt: String,
    attachment: Option<Attachment>,
}

impl PendingSend {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or a request already in flight; nothing changed.
    Rejected,
    Replied,
    Failed,
}

/// Validates the input and, if accepted, appends the user message and marks
/// the conversation as loading.
pub fn begin_send(
    store: &mut Conversation,
    text: &str,
    attachment: Option<Attachment>,
) -> Option<PendingSend> {
    if store.is_loading() {
        debug!("Send rejected: a request is already in flight");
        return None;
    }
    if text.trim().is_empty() && attachment.is_none() {
        debug!("Send rejected: empty input");
        return None;
    }

    store.append(Message::user(text, attachment.clone()));
    store.set_loading(true);
    info!(
        "Send started (text_len={}, attachment={})",
        text.len(),
        attachment.as_ref().map(Attachment::mime_type).unwrap_or("none")
    );

    Some(PendingSend {
        prompt: text.to_string(),
        attachment,
    })
}

/// Appends the reply (or the fixed error message) and clears loading.
pub fn finish_send(
    store: &mut Conversation,
    pending: PendingSend,
    result: Result<Reply, TransportError>,
) -> SendOutcome {
    let outcome = match result {
        Ok(reply) => {
            info!(
                "Send finished (reply_len={}, image={})",
                reply.text.len(),
                reply.image.is_some()
            );
            store.append(Message::model(reply.text, reply.image));
            SendOutcome::Replied
        }
        Err(e) => {
            warn!(
                "Send failed for prompt of {} bytes: {}",
                pending.prompt.len(),
                e
            );
            store.append(Message::send_error());
            SendOutcome::Failed
        }
    };
    store.set_loading(false);
    outcome
}

/// Runs a whole send: begin, await the transport, finish.
pub async fn send(
    store: &mut Conversation,
    transport: &dyn ChatTransport,
    text: &str,
    attachment: Option<Attachment>,
) -> SendOutcome {
    let Some(pending) = begin_send(store, text, attachment) else {
        return SendOutcome::Rejected;
    };
    let result = transport
        .request(pending.prompt(), pending.attachment())
        .await;
    finish_send(store, pending, result)
}
