//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! matched ProxyRule + inbound request
//!     → forward.rs (URI + Host rewrite, strip hop-by-hop headers)
//!     → client.rs (verified or unverified pool, per rule TLS policy)
//!     → upstream response streamed back verbatim
//!     → error.rs maps connect failures to 502
//! ```

pub mod client;
pub mod error;
pub mod forward;

pub use client::UpstreamClient;
pub use error::ProxyError;
pub use forward::forward;
