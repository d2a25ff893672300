//! HTTP transport for the segmentation service.
//!
//! One multipart POST per send:
//!
//! ```text
//! prompt        text     always
//! image         binary   LocalFile / RemoteBytes attachments
//! imageBase64   text     InlineEncoded attachments
//! mimeType      text     InlineEncoded attachments
//! ```
//!
//! No retries, no timeout. A request that never settles keeps the
//! conversation loading until it does.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use super::remote::{ChatTransport, TransportError};
use super::types::{Reply, ReplyBody, ReplyFormat, image_mime_from_header};
use crate::core::attachment::{Attachment, AttachmentSource};
use crate::core::config::ResolvedConfig;

pub struct HttpTransport {
    url: String,
    reply_format: ReplyFormat,
    image_caption: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        endpoint_path: &str,
        reply_format: ReplyFormat,
        image_caption: String,
    ) -> Self {
        Self {
            url: join_url(base_url, endpoint_path),
            reply_format,
            image_caption,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.endpoint_path,
            config.reply_format,
            config.image_caption.clone(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn build_form(
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<Form, TransportError> {
        let form = Form::new().text("prompt", prompt.to_string());
        let Some(attachment) = attachment else {
            return Ok(form);
        };

        let bytes = match attachment.source() {
            AttachmentSource::InlineEncoded { data } => {
                debug!("Attaching inline image ({} base64 chars)", data.len());
                return Ok(form
                    .text("imageBase64", data.clone())
                    .text("mimeType", attachment.mime_type().to_string()));
            }
            AttachmentSource::LocalFile { path } => tokio::fs::read(path)
                .await
                .map_err(|e| TransportError::Attachment(format!("{}: {e}", path.display())))?,
            AttachmentSource::RemoteBytes { bytes } => bytes.to_vec(),
        };

        debug!("Attaching image part: {} ({} bytes)", attachment.name(), bytes.len());
        let part = Part::bytes(bytes)
            .file_name(attachment.name().to_string())
            .mime_str(attachment.mime_type())
            .map_err(|e| TransportError::Attachment(e.to_string()))?;
        Ok(form.part("image", part))
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn request(
        &self,
        prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<Reply, TransportError> {
        let form = Self::build_form(prompt, attachment).await?;

        info!(
            "POST {} (prompt_len={}, attachment={}, reply_format={})",
            self.url,
            prompt.len(),
            attachment.map(Attachment::mime_type).unwrap_or("none"),
            self.reply_format.label()
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!("Response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Request failed".to_string());
            warn!("Remote service error: {} - {}", status, message);
            return Err(TransportError::RequestFailed { status, message });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!(
            "Reply body: {} bytes, content-type {:?}",
            body.len(),
            content_type
        );

        let reply = match self.reply_format {
            ReplyFormat::Json => serde_json::from_slice::<ReplyBody>(&body)
                .map_err(|e| TransportError::Parse(e.to_string()))?
                .into_reply()?,
            ReplyFormat::Image => {
                if body.is_empty() {
                    return Err(TransportError::Parse("empty image body".to_string()));
                }
                let mime = image_mime_from_header(content_type.as_deref());
                Reply {
                    text: self.image_caption.clone(),
                    image: Some(Attachment::from_bytes(body.to_vec(), &mime)),
                }
            }
        };

        if let Some(image) = &reply.image
            && let Err(e) = image.materialize_preview()
        {
            warn!("Could not write preview for reply image: {}", e);
        }

        Ok(reply)
    }
}

/// Joins a base URL and an endpoint path with exactly one slash between them.
fn join_url(base_url: &str, endpoint_path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = endpoint_path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}
