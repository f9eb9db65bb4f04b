//! Runs the dev server and restarts it when the config changes.
//!
//! A restart is all-or-nothing: the old server is drained, then a server
//! built entirely from the new config is bound. The rule table of a running
//! server never changes. A new config whose listen address cannot be bound
//! is rejected like an invalid one.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::{ConfigWatcher, DevServerConfig};
use crate::http::DevServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::startup::{bind, StartupError};

/// Quiet period for coalescing bursts of file events into one restart.
const SETTLE: Duration = Duration::from_millis(150);

pub struct Supervisor {
    config_path: PathBuf,
    watch: bool,
}

impl Supervisor {
    pub fn new(config_path: impl Into<PathBuf>, watch: bool) -> Self {
        Self {
            config_path: config_path.into(),
            watch,
        }
    }

    /// Serve `initial` until `stop` resolves.
    pub async fn run<F>(self, initial: DevServerConfig, stop: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()>,
    {
        let mut current = initial.clone();
        let mut server = DevServer::new(initial)?;

        let (_watcher, mut updates) = if self.watch {
            let (watcher, updates) = ConfigWatcher::new(&self.config_path);
            (Some(watcher.run()?), updates)
        } else {
            // Sender dropped: the update branch below never fires.
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        };

        tokio::pin!(stop);

        let mut listener = bind(&server.config().dev_server).await?;

        loop {
            let shutdown = Shutdown::new();
            let mut handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

            let (next, prebound) = loop {
                tokio::select! {
                    result = &mut handle => {
                        return join_result(result);
                    }
                    _ = &mut stop => {
                        shutdown.trigger();
                        return join_result(handle.await);
                    }
                    Some(config) = updates.recv() => {
                        let config = settle(config, &mut updates).await;
                        if config == current {
                            tracing::debug!("Configuration unchanged, not restarting");
                            continue;
                        }
                        let next = match DevServer::new(config) {
                            Ok(next) => next,
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "New configuration rejected. Keeping current server."
                                );
                                continue;
                            }
                        };

                        // Same address: it only frees up once the old server drains.
                        let settings = &next.config().dev_server;
                        if settings.bind_address() == current.dev_server.bind_address() {
                            break (next, None);
                        }
                        let bound = bind(settings).await;
                        match bound {
                            Ok(listener) => break (next, Some(listener)),
                            Err(e) => tracing::error!(
                                error = %e,
                                "New listen address unavailable. Keeping current server."
                            ),
                        }
                    }
                }
            };

            tracing::info!(
                path = ?self.config_path,
                "Configuration changed, restarting dev server"
            );
            shutdown.trigger();
            join_result(handle.await)?;

            listener = match prebound {
                Some(listener) => listener,
                None => bind(&next.config().dev_server).await?,
            };
            current = next.config().clone();
            server = next;
        }
    }
}

/// Wait out an event burst and keep only the latest config.
async fn settle(
    mut latest: DevServerConfig,
    updates: &mut mpsc::UnboundedReceiver<DevServerConfig>,
) -> DevServerConfig {
    tokio::time::sleep(SETTLE).await;
    while let Ok(config) = updates.try_recv() {
        latest = config;
    }
    latest
}

type ServeResult = Result<Result<(), std::io::Error>, tokio::task::JoinError>;

fn join_result(result: ServeResult) -> Result<(), StartupError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(StartupError::Serve(e)),
        Err(e) => Err(StartupError::Serve(std::io::Error::other(e))),
    }
}
