//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::attachment::Attachment;
use crate::core::state::App;
use crate::transport::{ChatTransport, Reply, TransportError};

enum Script {
    Text(String),
    TextWithImage(String, Vec<u8>),
    Status(u16),
}

/// A transport that answers every request the same way and records what it
/// was asked.
pub struct ScriptedTransport {
    script: Script,
    calls: Mutex<Vec<(String, bool)>>,
}

impl ScriptedTransport {
    fn with(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::with(Script::Text(text.to_string()))
    }

    pub fn text_with_image(text: &str, bytes: Vec<u8>) -> Self {
        Self::with(Script::TextWithImage(text.to_string(), bytes))
    }

    pub fn status(status: u16) -> Self {
        Self::with(Script::Status(status))
    }

    /// `(prompt, had_attachment)` for every request, in order.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn request(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<Reply, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), attachment.is_some()));
        match &self.script {
            Script::Text(text) => Ok(Reply {
                text: text.clone(),
                image: None,
            }),
            Script::TextWithImage(text, bytes) => Ok(Reply {
                text: text.clone(),
                image: Some(Attachment::from_bytes(bytes.clone(), "image/png")),
            }),
            Script::Status(status) => Err(TransportError::RequestFailed {
                status: *status,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

/// An inline PNG attachment that needs no file on disk.
pub fn png_attachment() -> Attachment {
    Attachment::from_base64("iVBORw0KGgo=", "image/png").unwrap()
}

/// Creates a test App backed by a `ScriptedTransport`.
pub fn test_app() -> App {
    App::new(
        Arc::new(ScriptedTransport::text("ok")),
        "http://test.local/message".to_string(),
        PathBuf::from("/tmp/segment-chat-test-downloads"),
    )
}
