//! Segment Chat library exports
//!
//! - [`core`]: conversation store, send pipeline, config
//! - [`transport`]: the remote chat service over HTTP
//! - [`tui`]: the ratatui front end
//! - [`headless`]: one-shot sends from the command line

pub mod core;
pub mod headless;
pub mod transport;
pub mod tui;

#[cfg(test)]
pub mod test_support;
