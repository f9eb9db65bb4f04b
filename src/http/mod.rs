//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (request ID)
//!     → module layers (e.g. access-log)
//!     → devtools.rs (when enabled)
//!     → dispatch: proxy rule match → proxy::forward
//!                 no match         → host_app.rs
//!     → Send to client
//! ```

pub mod devtools;
pub mod host_app;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, DevServer};
