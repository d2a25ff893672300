use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::remote::TransportError;
use crate::core::attachment::{Attachment, split_data_url};

const DEFAULT_REPLY_MIME: &str = "image/png";

/// How the service encodes its reply body.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    /// `{ "text": ..., "image": { "bytes": <base64>, "mimeType": ... } }`
    #[default]
    Json,
    /// Raw image bytes; the caption comes from config.
    Image,
}

impl ReplyFormat {
    pub fn label(self) -> &'static str {
        match self {
            ReplyFormat::Json => "json",
            ReplyFormat::Image => "image",
        }
    }
}

/// What a successful request produced.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub image: Option<Attachment>,
}

/// JSON reply body.
#[derive(Deserialize, Debug)]
pub struct ReplyBody {
    pub text: String,
    #[serde(default)]
    pub image: Option<ReplyImage>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReplyImage {
    /// Base64, optionally as a `data:` URL.
    pub bytes: String,
    #[serde(default, alias = "mime_type")]
    pub mime_type: Option<String>,
}

impl ReplyBody {
    pub fn into_reply(self) -> Result<Reply, TransportError> {
        let image = match self.image {
            Some(img) => {
                let (url_mime, payload) = split_data_url(&img.bytes);
                let mime = img
                    .mime_type
                    .as_deref()
                    .or(url_mime)
                    .unwrap_or(DEFAULT_REPLY_MIME)
                    .to_string();
                let bytes = STANDARD
                    .decode(payload.trim())
                    .map_err(|e| TransportError::Parse(format!("image bytes: {e}")))?;
                Some(Attachment::from_bytes(bytes, &mime))
            }
            None => None,
        };
        Ok(Reply {
            text: self.text,
            image,
        })
    }
}

/// Media type for a raw image reply, taken from the `Content-Type` header.
pub fn image_mime_from_header(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or(DEFAULT_REPLY_MIME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_reply() {
        let body: ReplyBody = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        let reply = body.into_reply().unwrap();
        assert_eq!(reply.text, "hi");
        assert!(reply.image.is_none());
    }

    #[test]
    fn test_reply_with_image_decodes_bytes() {
        let body: ReplyBody =
            serde_json::from_str(r#"{"text":"ok","image":{"bytes":"AQID","mimeType":"image/jpeg"}}"#)
                .unwrap();
        let reply = body.into_reply().unwrap();
        let image = reply.image.unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.load_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_reply_image_data_url_supplies_mime() {
        let body: ReplyBody = serde_json::from_str(
            r#"{"text":"","image":{"bytes":"data:image/webp;base64,AQID"}}"#,
        )
        .unwrap();
        let image = body.into_reply().unwrap().image.unwrap();
        assert_eq!(image.mime_type(), "image/webp");
    }

    #[test]
    fn test_reply_bad_base64_is_parse_error() {
        let body: ReplyBody =
            serde_json::from_str(r#"{"text":"x","image":{"bytes":"%%%"}}"#).unwrap();
        assert!(matches!(body.into_reply(), Err(TransportError::Parse(_))));
    }

    #[test]
    fn test_reply_missing_text_fails_to_deserialize() {
        assert!(serde_json::from_str::<ReplyBody>(r#"{"image":null}"#).is_err());
    }

    #[test]
    fn test_image_mime_from_header() {
        assert_eq!(image_mime_from_header(Some("image/jpeg; q=1")), "image/jpeg");
        assert_eq!(image_mime_from_header(Some("application/octet-stream")), "image/png");
        assert_eq!(image_mime_from_header(None), "image/png");
    }

    #[test]
    fn test_reply_format_serde() {
        assert_eq!(serde_json::to_string(&ReplyFormat::Image).unwrap(), r#""image""#);
        let parsed: ReplyFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(parsed, ReplyFormat::Json);
    }
}
