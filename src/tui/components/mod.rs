//! # TUI Components
//!
//! ## Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: Endpoint, status and the "↓ New" marker
//! - `MessageBubble`: One chat bubble
//! - `LandingPage`: Welcome text for an empty conversation
//!
//! ## Stateful Components (Event-Driven)
//!
//! - `Composer`: Message editor with its attachment slot
//! - `MessageList`: Scrollable conversation with layout caching
//!
//! Each file holds the component's state, events, rendering, event handling
//! and tests. Components receive external data as props (struct fields)
//! rather than reaching into `App`.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── message.rs       (MessageBubble)
//! ├── message_list.rs
//! ├── landing.rs
//! └── composer/
//!     ├── mod.rs
//!     └── layout.rs    (row wrapping and cursor mapping)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod composer;
pub use composer::{Composer, ComposerEvent, ComposerMode};
pub mod message;
pub use message::MessageBubble;
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod landing;
pub use landing::LandingPage;
