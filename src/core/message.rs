//! # Messages
//!
//! A `Message` is one entry in the conversation thread. Messages are built by
//! the send pipeline and never change after that: every field is private and
//! only exposed through accessors.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::attachment::Attachment;

/// Fixed, user-visible text of the message appended when a send fails.
pub const SEND_ERROR_TEXT: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Model => "segment",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    id: String,
    role: Role,
    text: Option<String>,
    attachment: Option<Attachment>,
    timestamp: DateTime<Local>,
    is_error: bool,
}

impl Message {
    fn new(role: Role, text: Option<String>, attachment: Option<Attachment>, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            attachment,
            timestamp: Local::now(),
            is_error,
        }
    }

    /// A message typed by the user. Blank text is stored as `None`.
    pub fn user(text: &str, attachment: Option<Attachment>) -> Self {
        let text = (!text.trim().is_empty()).then(|| text.to_string());
        Self::new(Role::User, text, attachment, false)
    }

    /// A reply from the remote service.
    pub fn model(text: String, attachment: Option<Attachment>) -> Self {
        let text = (!text.is_empty()).then_some(text);
        Self::new(Role::Model, text, attachment, false)
    }

    /// The error reply shown when a send fails.
    pub fn send_error() -> Self {
        Self::new(Role::Model, Some(SEND_ERROR_TEXT.to_string()), None, true)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}
