//! # Core Application Logic
//!
//! This module contains Segment Chat's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Conversation (store) │
//!                    │  • pipeline (send)      │
//!                    │  • Action / update()    │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │ Transport  │
//!            │  Adapter   │            │  (HTTP)    │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`conversation`]: The append-only thread and its loading flag
//! - [`pipeline`]: Begin/finish halves of a send
//! - [`message`], [`attachment`]: The data model
//! - [`config`]: Config file, env and CLI resolution

pub mod action;
pub mod attachment;
pub mod config;
pub mod conversation;
pub mod message;
pub mod pipeline;
pub mod state;
