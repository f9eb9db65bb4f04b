//! Dev server modules.
//!
//! # Data Flow
//! ```text
//! modules = ["lint", "access-log"]
//!     → resolve every id against the built-in registry (unknown id = error)
//!     → setup() each module in declared order
//!     → wrap() the finished router in declared order (last = outermost)
//! ```

pub mod access_log;
pub mod lint;

use axum::Router;
use thiserror::Error;

use crate::config::DevServerConfig;

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("unknown module `{0}` (available: {available})", available = BUILTIN.join(", "))]
    Unknown(String),

    #[error("module `{module}` failed during setup: {message}")]
    Setup {
        module: &'static str,
        message: String,
    },
}

/// Identifiers the registry knows about.
pub const BUILTIN: [&str; 2] = [lint::ID, access_log::ID];

/// A unit of dev server behavior selected by the `modules` list.
pub trait DevModule: Send + Sync {
    fn id(&self) -> &'static str;

    /// Runs once before the server starts serving.
    fn setup(&self, _config: &DevServerConfig) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Wrap the request router, e.g. with a middleware layer.
    fn wrap(&self, router: Router) -> Router {
        router
    }
}

fn resolve(id: &str) -> Option<Box<dyn DevModule>> {
    match id {
        lint::ID => Some(Box::new(lint::LintModule)),
        access_log::ID => Some(Box::new(access_log::AccessLogModule)),
        _ => None,
    }
}

/// Modules that passed setup, in declared order.
#[derive(Default)]
pub struct LoadedModules {
    modules: Vec<Box<dyn DevModule>>,
}

impl LoadedModules {
    pub fn ids(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    pub fn wrap(&self, router: Router) -> Router {
        self.modules.iter().fold(router, |router, m| m.wrap(router))
    }
}

impl std::fmt::Debug for LoadedModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

/// Resolve and set up the configured modules.
///
/// All identifiers are resolved before any setup runs, so an unknown id
/// fails without side effects.
pub fn load(config: &DevServerConfig) -> Result<LoadedModules, ModuleError> {
    let modules = config
        .modules
        .iter()
        .map(|id| resolve(id).ok_or_else(|| ModuleError::Unknown(id.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    for module in &modules {
        module.setup(config)?;
        tracing::info!(module = module.id(), "Module loaded");
    }

    Ok(LoadedModules { modules })
}
