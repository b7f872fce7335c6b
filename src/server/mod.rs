pub mod auth;
pub mod config;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
