//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.segment-chat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::transport::ReplyFormat;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub path: Option<String>,
    pub reply_format: Option<ReplyFormat>,
    pub image_caption: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub download_dir: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ENDPOINT_PATH: &str = "/message";
pub const DEFAULT_IMAGE_CAPTION: &str = "Segmented image";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub endpoint_path: String,
    pub reply_format: ReplyFormat,
    pub image_caption: String,
    pub download_dir: PathBuf,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub base_url: Option<&'a str>,
    pub endpoint_path: Option<&'a str>,
    pub reply_format: Option<ReplyFormat>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.segment-chat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".segment-chat").join("config.toml"))
}

/// Load config from `~/.segment-chat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ChatConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ChatConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<ChatConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Segment Chat Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults -> this file -> env vars -> CLI flags.

# [endpoint]
# base_url = "http://127.0.0.1:8000"   # Or set SEGMENT_CHAT_BASE_URL
# path = "/message"                    # Or set SEGMENT_CHAT_ENDPOINT_PATH
# reply_format = "json"                # "json" or "image" (raw image bytes)
# image_caption = "Segmented image"    # Caption used with reply_format = "image"

# [ui]
# download_dir = "~/Downloads"         # Where Ctrl+S saves returned images
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ChatConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .map(str::to_string)
        .or_else(|| std::env::var("SEGMENT_CHAT_BASE_URL").ok())
        .or_else(|| config.endpoint.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Endpoint path: CLI → env → config → default
    let endpoint_path = cli
        .endpoint_path
        .map(str::to_string)
        .or_else(|| std::env::var("SEGMENT_CHAT_ENDPOINT_PATH").ok())
        .or_else(|| config.endpoint.path.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT_PATH.to_string());

    // Reply format: CLI → env → config → default. Unknown env values are ignored.
    let reply_format = cli
        .reply_format
        .or_else(|| {
            std::env::var("SEGMENT_CHAT_REPLY_FORMAT")
                .ok()
                .and_then(|v| parse_reply_format(&v))
        })
        .or(config.endpoint.reply_format)
        .unwrap_or_default();

    let image_caption = config
        .endpoint
        .image_caption
        .clone()
        .unwrap_or_else(|| DEFAULT_IMAGE_CAPTION.to_string());

    // Download dir: env → config → platform download dir → cwd
    let download_dir = std::env::var("SEGMENT_CHAT_DOWNLOAD_DIR")
        .ok()
        .or_else(|| config.ui.download_dir.clone())
        .map(|d| expand_home(&d))
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    ResolvedConfig {
        base_url,
        endpoint_path,
        reply_format,
        image_caption,
        download_dir,
    }
}

fn parse_reply_format(value: &str) -> Option<ReplyFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Some(ReplyFormat::Json),
        "image" => Some(ReplyFormat::Image),
        other => {
            warn!("Ignoring unknown reply format '{}'", other);
            None
        }
    }
}

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = ChatConfig::default();
        assert!(config.endpoint.base_url.is_none());
        assert!(config.ui.download_dir.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ChatConfig {
            endpoint: EndpointConfig {
                base_url: Some("http://seg.local:9000".to_string()),
                path: Some("/chat".to_string()),
                reply_format: Some(ReplyFormat::Image),
                image_caption: Some("Edges".to_string()),
            },
            ui: UiConfig {
                download_dir: Some("/tmp/segments".to_string()),
            },
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.endpoint_path, "/chat");
        assert_eq!(resolved.image_caption, "Edges");
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = ChatConfig {
            endpoint: EndpointConfig {
                base_url: Some("http://from-config".to_string()),
                path: Some("/from-config".to_string()),
                reply_format: Some(ReplyFormat::Json),
                image_caption: None,
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            base_url: Some("http://from-cli"),
            endpoint_path: Some("/cli"),
            reply_format: Some(ReplyFormat::Image),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.base_url, "http://from-cli");
        assert_eq!(resolved.endpoint_path, "/cli");
        assert_eq!(resolved.reply_format, ReplyFormat::Image);
        assert_eq!(resolved.image_caption, DEFAULT_IMAGE_CAPTION);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[endpoint]
base_url = "http://127.0.0.1:8000"
path = "/chat"
reply_format = "image"
image_caption = "Segmented"

[ui]
download_dir = "~/Pictures"
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.path.as_deref(), Some("/chat"));
        assert_eq!(config.endpoint.reply_format, Some(ReplyFormat::Image));
        assert_eq!(config.ui.download_dir.as_deref(), Some("~/Pictures"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[endpoint]
path = "/segment"
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.path.as_deref(), Some("/segment"));
        assert!(config.endpoint.base_url.is_none());
        assert!(config.endpoint.reply_format.is_none());
    }

    #[test]
    fn test_bad_reply_format_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[endpoint]\nreply_format = \"xml\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_reply_format() {
        assert_eq!(parse_reply_format(" JSON "), Some(ReplyFormat::Json));
        assert_eq!(parse_reply_format("image"), Some(ReplyFormat::Image));
        assert_eq!(parse_reply_format("png"), None);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/Downloads"), home.join("Downloads"));
        }
    }
}
