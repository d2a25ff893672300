//! # Attachments
//!
//! An image that rides along with a message. Where the bytes live depends on
//! who produced the attachment:
//!
//! ```text
//! AttachmentSource
//! ├── LocalFile { path }        // picked or dropped by the user, read at send time
//! ├── InlineEncoded { data }    // base64 text, sent as `imageBase64` + `mimeType`
//! └── RemoteBytes { bytes }     // returned by the remote service
//! ```
//!
//! Every attachment also owns a preview reference: a path a viewer can open.
//! Local files preview as themselves. Encoded and remote bytes are written to
//! a temp file on demand, and that file is removed when the last clone of the
//! attachment is dropped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Local;
use log::{debug, warn};
use uuid::Uuid;

const DEFAULT_IMAGE_NAME: &str = "Image";

#[derive(Debug)]
pub enum AttachmentError {
    /// Path does not exist or is not a regular file.
    NotFound(PathBuf),
    /// The file is not one of the supported image types.
    Unsupported(String),
    /// Inline data is not valid base64, or its media type is not an image.
    InvalidEncoding(String),
    Io(std::io::Error),
}

impl fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentError::NotFound(path) => write!(f, "file not found: {}", path.display()),
            AttachmentError::Unsupported(name) => {
                write!(f, "{name} is not an image. Please upload an image file.")
            }
            AttachmentError::InvalidEncoding(msg) => write!(f, "invalid image data: {msg}"),
            AttachmentError::Io(e) => write!(f, "attachment I/O error: {e}"),
        }
    }
}

impl std::error::Error for AttachmentError {}

impl From<std::io::Error> for AttachmentError {
    fn from(e: std::io::Error) -> Self {
        AttachmentError::Io(e)
    }
}

#[derive(Debug, Clone)]
pub enum AttachmentSource {
    LocalFile { path: PathBuf },
    InlineEncoded { data: String },
    RemoteBytes { bytes: Arc<[u8]> },
}

#[derive(Debug, Clone)]
pub struct Attachment {
    source: AttachmentSource,
    mime_type: String,
    name: String,
    preview: Arc<PreviewRef>,
}

impl Attachment {
    /// Builds an attachment from a file on disk, rejecting anything that is
    /// not a supported image type.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AttachmentError::NotFound(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string());

        let mime_type = mime_from_path(path).ok_or_else(|| AttachmentError::Unsupported(name.clone()))?;

        debug!("Attachment from {} ({})", path.display(), mime_type);
        Ok(Self {
            source: AttachmentSource::LocalFile {
                path: path.to_path_buf(),
            },
            mime_type: mime_type.to_string(),
            name,
            preview: Arc::new(PreviewRef::borrowed(path.to_path_buf())),
        })
    }

    /// Builds an attachment from base64 data. A `data:<mime>;base64,` prefix
    /// is stripped, and its media type wins over `mime_type` when present.
    pub fn from_base64(data: &str, mime_type: &str) -> Result<Self, AttachmentError> {
        let (prefix_mime, payload) = split_data_url(data);
        let mime_type = prefix_mime.unwrap_or(mime_type).trim().to_string();
        if !mime_type.starts_with("image/") {
            return Err(AttachmentError::InvalidEncoding(format!(
                "media type {mime_type} is not an image"
            )));
        }
        STANDARD
            .decode(payload)
            .map_err(|e| AttachmentError::InvalidEncoding(e.to_string()))?;

        Ok(Self {
            source: AttachmentSource::InlineEncoded {
                data: payload.to_string(),
            },
            mime_type,
            name: DEFAULT_IMAGE_NAME.to_string(),
            preview: Arc::new(PreviewRef::owned()),
        })
    }

    /// Wraps bytes returned by the remote service.
    pub fn from_bytes(bytes: Vec<u8>, mime_type: &str) -> Self {
        Self {
            source: AttachmentSource::RemoteBytes {
                bytes: bytes.into(),
            },
            mime_type: mime_type.to_string(),
            name: format!("segmented.{}", extension_for(mime_type)),
            preview: Arc::new(PreviewRef::owned()),
        }
    }

    pub fn source(&self) -> &AttachmentSource {
        &self.source
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads or decodes the raw image bytes.
    pub fn load_bytes(&self) -> Result<Vec<u8>, AttachmentError> {
        match &self.source {
            AttachmentSource::LocalFile { path } => Ok(fs::read(path)?),
            AttachmentSource::InlineEncoded { data } => STANDARD
                .decode(data)
                .map_err(|e| AttachmentError::InvalidEncoding(e.to_string())),
            AttachmentSource::RemoteBytes { bytes } => Ok(bytes.to_vec()),
        }
    }

    /// Returns the preview path, writing the temp file first if needed.
    pub fn materialize_preview(&self) -> Result<PathBuf, AttachmentError> {
        if let Some(path) = self.preview.path() {
            return Ok(path);
        }
        let dir = std::env::temp_dir().join("segment-chat").join("previews");
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), extension_for(&self.mime_type)));
        fs::write(&path, self.load_bytes()?)?;
        debug!("Wrote preview {}", path.display());
        self.preview.set(path.clone());
        Ok(path)
    }

    /// The preview path, if one exists yet. Never touches the disk.
    pub fn preview_path(&self) -> Option<PathBuf> {
        self.preview.path()
    }

    /// Writes the image into `dir` under a timestamped name and returns the
    /// written path.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, AttachmentError> {
        fs::create_dir_all(dir)?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S%3f");
        let path = dir.join(format!("segment-{stamp}.{}", extension_for(&self.mime_type)));
        fs::write(&path, self.load_bytes()?)?;
        Ok(path)
    }
}

/// Display-only handle to an attachment's bytes on disk.
#[derive(Debug)]
pub struct PreviewRef {
    path: Mutex<Option<PathBuf>>,
    /// True when the file was written by us and must be released.
    owned: bool,
}

impl PreviewRef {
    fn borrowed(path: PathBuf) -> Self {
        Self {
            path: Mutex::new(Some(path)),
            owned: false,
        }
    }

    fn owned() -> Self {
        Self {
            path: Mutex::new(None),
            owned: true,
        }
    }

    fn path(&self) -> Option<PathBuf> {
        self.path.lock().ok().and_then(|slot| slot.clone())
    }

    fn set(&self, path: PathBuf) {
        if let Ok(mut slot) = self.path.lock() {
            *slot = Some(path);
        }
    }
}

impl Drop for PreviewRef {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        if let Ok(slot) = self.path.get_mut()
            && let Some(path) = slot.take()
            && let Err(e) = fs::remove_file(&path)
        {
            warn!("Failed to release preview {}: {}", path.display(), e);
        }
    }
}

/// Maps a file extension to its image media type.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "png",
    }
}

/// Splits `data:image/png;base64,AAAA` into `(Some("image/png"), "AAAA")`.
/// Plain base64 comes back unchanged with no media type.
pub fn split_data_url(data: &str) -> (Option<&str>, &str) {
    match data.split_once(',') {
        Some((header, payload)) if header.starts_with("data:") => {
            let mime = header
                .trim_start_matches("data:")
                .split(';')
                .next()
                .filter(|m| !m.is_empty());
            (mime, payload)
        }
        Some((_, payload)) => (None, payload),
        None => (None, data),
    }
}
