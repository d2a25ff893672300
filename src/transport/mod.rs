//! # Remote Transport
//!
//! The boundary to the segmentation service. `ChatTransport` is the seam the
//! pipeline talks to; `HttpTransport` is the multipart-over-HTTP
//! implementation.

pub mod http;
pub mod remote;
pub mod types;

pub use http::HttpTransport;
pub use remote::{ChatTransport, TransportError};
pub use types::{Reply, ReplyFormat};
