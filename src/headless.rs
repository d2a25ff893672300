//! # One-shot Mode
//!
//! `segment-chat --prompt "..." [--image path]` sends a single message
//! through the same pipeline the TUI uses, prints the thread to stdout and
//! saves any returned image into the download directory.

use std::io::{self, Write};
use std::path::Path;

use log::{info, warn};

use crate::core::attachment::Attachment;
use crate::core::conversation::Conversation;
use crate::core::message::Message;
use crate::core::pipeline::{self, SendOutcome};
use crate::transport::ChatTransport;

pub async fn run<W: Write>(
    transport: &dyn ChatTransport,
    prompt: &str,
    image: Option<&Path>,
    download_dir: &Path,
    out: &mut W,
) -> io::Result<SendOutcome> {
    let attachment = image
        .map(Attachment::from_path)
        .transpose()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut conversation = Conversation::new();
    let outcome = pipeline::send(&mut conversation, transport, prompt, attachment).await;
    info!("One-shot send finished: {:?}", outcome);

    for message in conversation.messages() {
        write_message(out, message)?;
    }

    if let Some(image) = conversation.last_model_image() {
        match image.save_to(download_dir) {
            Ok(path) => writeln!(out, "Saved image to {}", path.display())?,
            Err(e) => {
                warn!("Could not save returned image: {}", e);
                writeln!(out, "Could not save returned image: {e}")?;
            }
        }
    }

    Ok(outcome)
}

fn write_message<W: Write>(out: &mut W, message: &Message) -> io::Result<()> {
    let label = if message.is_error() {
        "error"
    } else {
        message.role().label()
    };
    writeln!(out, "[{}] {}", message.timestamp().format("%H:%M"), label)?;
    if let Some(attachment) = message.attachment() {
        writeln!(out, "  ▣ {} ({})", attachment.name(), attachment.mime_type())?;
    }
    if let Some(text) = message.text() {
        for line in text.lines() {
            writeln!(out, "  {line}")?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::SEND_ERROR_TEXT;
    use crate::test_support::ScriptedTransport;

    #[tokio::test]
    async fn test_prints_thread_and_saves_image() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::text_with_image("Here is the mask", vec![7, 7]);
        let mut out = Vec::new();

        let outcome = run(&transport, "segment the dog", None, dir.path(), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, SendOutcome::Replied);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("you"));
        assert!(printed.contains("segment the dog"));
        assert!(printed.contains("Here is the mask"));
        assert!(printed.contains("segmented.png"));
        assert!(printed.contains("Saved image to"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_failure_prints_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::status(500);
        let mut out = Vec::new();

        let outcome = run(&transport, "hi", None, dir.path(), &mut out).await.unwrap();

        assert_eq!(outcome, SendOutcome::Failed);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("error"));
        assert!(printed.contains(SEND_ERROR_TEXT));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_non_image_attachment_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "x").unwrap();
        let transport = ScriptedTransport::text("unused");
        let mut out = Vec::new();

        let err = run(&transport, "hi", Some(&notes), dir.path(), &mut out)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let transport = ScriptedTransport::text("unused");
        let mut out = Vec::new();

        let outcome = run(&transport, "  ", None, dir.path(), &mut out).await.unwrap();

        assert_eq!(outcome, SendOutcome::Rejected);
        assert_eq!(transport.call_count(), 0);
        assert!(out.is_empty());
    }
}
