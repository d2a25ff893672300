//! # Application State
//!
//! Core business state for Segment Chat. This module contains domain logic
//! only, no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── transport: Arc<dyn ChatTransport>  // remote service
//! ├── conversation: Conversation         // thread + loading flag
//! ├── pending: Option<PendingSend>       // the one in-flight send
//! ├── status_message: String             // title bar text
//! ├── endpoint: String                   // shown in the title bar
//! └── download_dir: PathBuf              // where Ctrl+S saves images
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::ResolvedConfig;
use crate::core::conversation::Conversation;
use crate::core::pipeline::PendingSend;
use crate::transport::ChatTransport;

pub const WELCOME_STATUS: &str = "Drop an image and describe the segmentation";

pub struct App {
    pub transport: Arc<dyn ChatTransport>,
    pub conversation: Conversation,
    /// Set between `begin_send` and `finish_send`.
    pub pending: Option<PendingSend>,
    pub status_message: String,
    pub endpoint: String,
    pub download_dir: PathBuf,
}

impl App {
    pub fn new(transport: Arc<dyn ChatTransport>, endpoint: String, download_dir: PathBuf) -> Self {
        Self {
            transport,
            conversation: Conversation::new(),
            pending: None,
            status_message: String::from(WELCOME_STATUS),
            endpoint,
            download_dir,
        }
    }

    pub fn from_config(transport: Arc<dyn ChatTransport>, config: &ResolvedConfig) -> Self {
        let endpoint = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.endpoint_path
        );
        Self::new(transport, endpoint, config.download_dir.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.conversation.is_loading()
    }
}
