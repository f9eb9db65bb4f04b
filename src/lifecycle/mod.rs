//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build server (rules, modules) → Bind listener
//!
//! Restart (supervisor.rs, --watch only):
//!     Config change → Validate → Build new server → Drain old → Bind new
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then modules, then listener
//! - A rejected config during --watch leaves the running server untouched

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use startup::StartupError;
pub use supervisor::Supervisor;
