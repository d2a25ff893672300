use std::fmt;

use async_trait::async_trait;

use super::types::Reply;
use crate::core::attachment::Attachment;

/// Errors that can occur while talking to the remote service.
/// None of them are retried; the pipeline turns every variant into the same
/// error message in the thread.
#[derive(Debug)]
pub enum TransportError {
    /// The attachment could not be read before sending.
    Attachment(String),
    /// Network-level failure (DNS, connection refused, body read).
    Network(String),
    /// The service answered with a non-success status.
    RequestFailed { status: u16, message: String },
    /// The reply body did not match the expected format.
    Parse(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Attachment(msg) => write!(f, "attachment error: {msg}"),
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::RequestFailed { status, message } => {
                write!(f, "request failed (HTTP {status}): {message}")
            }
            TransportError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Returns the name of the transport, for logs and the title bar.
    fn name(&self) -> &str;

    /// Sends one prompt, with an optional image, and waits for the reply.
    async fn request(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<Reply, TransportError>;
}
