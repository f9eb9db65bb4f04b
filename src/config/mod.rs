//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! devserver.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DevServerConfig (validated, immutable)
//!     → handed to the dev server at start
//!
//! With --watch:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → supervisor restarts the server with it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    DevServerConfig, DevServerSettings, DevtoolsConfig, LintConfig, ObservabilityConfig,
    ProxyTable, ProxyTargetConfig, ViteConfig, ViteServerConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
