//! Movie catalog server library
//!
//! Exposes the internal modules to the binaries and the end-to-end tests.

pub mod catalog_import;
pub mod catalog_service;
pub mod catalog_store;
pub mod config;
pub mod enrichment;
pub mod metadata;
pub mod server;
pub mod sqlite_persistence;
pub mod user_content;

pub use catalog_service::CatalogService;
pub use server::{make_app, run_server, RequestsLoggingLevel};
