//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, COMPLETE_MOVIE_ID};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_details() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_movie_details(COMPLETE_MOVIE_ID).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::{sign_token, TestClient};
pub use constants::*;
pub use fixtures::FakeProviderServer;
pub use server::TestServer;
