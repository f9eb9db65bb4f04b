//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Request ID (http::request) flows through every request span and is
//! forwarded upstream in x-request-id.
//! ```

pub mod logging;
