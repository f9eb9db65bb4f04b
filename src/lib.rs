//! Development server with a declarative reverse-proxy rule table.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod modules;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::DevServerConfig;
pub use http::DevServer;
pub use lifecycle::{Shutdown, Supervisor};
