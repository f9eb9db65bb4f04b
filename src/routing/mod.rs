//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule compilation (at startup):
//!     [vite.server.proxy] table
//!     → rule.rs (validate prefix, parse target URL)
//!     → router.rs (sort by prefix length)
//!     → Freeze as immutable RuleTable
//!
//! Incoming request path
//!     → router.rs (longest-prefix lookup)
//!     → Return: matched ProxyRule or None (host app serves it)
//! ```

pub mod matcher;
pub mod router;
pub mod rule;

pub use router::RuleTable;
pub use rule::{ProxyRule, RouteError, TlsVerification};
