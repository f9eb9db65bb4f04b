//! Startup errors and listener binding.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is served
//! - The listener is bound last, after the server is fully built

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, DevServerSettings};
use crate::modules::ModuleError;
use crate::proxy::ProxyError;
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid proxy rule: {0}")]
    Route(#[from] RouteError),

    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("static_dir {0} is not a directory")]
    StaticDir(PathBuf),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("config watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Bind the dev server listener.
pub async fn bind(settings: &DevServerSettings) -> Result<TcpListener, StartupError> {
    let address = settings.bind_address();
    let addr: SocketAddr = address.parse().map_err(|e| StartupError::Bind {
        address: address.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let local_addr = listener.local_addr().map_err(StartupError::Serve)?;
    tracing::info!(address = %local_addr, "Listener bound");

    Ok(listener)
}
