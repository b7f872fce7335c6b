//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use jsonwebtoken::{encode, EncodingKey, Header};
use movie_catalog_server::server::auth::TokenClaims;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client, optionally sending a bearer token on every request
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    token: Option<String>,
}

/// Signs a token for `user_id` with the test secret, valid for an hour
pub fn sign_token(user_id: &str) -> String {
    let claims = TokenClaims {
        uid: Some(user_id.to_string()),
        sub: None,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

impl TestClient {
    /// Creates a client that sends no token
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client that sends a valid token issued to `user_id`
    pub fn authenticated(base_url: String, user_id: &str) -> Self {
        Self::new(base_url).with_token(sign_token(user_id))
    }

    /// Replaces the token sent with each request
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    async fn get(&self, path: &str) -> Response {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("GET request failed")
    }

    async fn post(&self, path: &str, body: Option<serde_json::Value>) -> Response {
        let mut request = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.send().await.expect("POST request failed")
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Movies
    // ========================================================================

    pub async fn list_movies(
        &self,
        sorting: &str,
        number: usize,
        offset: usize,
        category: &str,
        descending: bool,
    ) -> Response {
        self.get(&format!(
            "/movies/list/{}/{}/{}/{}/{}",
            sorting, number, offset, category, descending as u8
        ))
        .await
    }

    pub async fn search_movies(
        &self,
        sorting: &str,
        number: usize,
        offset: usize,
        category: &str,
        descending: bool,
        movie_name: &str,
    ) -> Response {
        self.get(&format!(
            "/movies/search/{}/{}/{}/{}/{}/{}",
            sorting,
            number,
            offset,
            category,
            descending as u8,
            urlencoding::encode(movie_name)
        ))
        .await
    }

    pub async fn get_movie_details(&self, movie_id: i64) -> Response {
        self.get(&format!("/movies/details/{}", movie_id)).await
    }

    pub async fn get_movie_details_with_favorites(
        &self,
        movie_id: i64,
        favorites: bool,
        user_id: &str,
    ) -> Response {
        self.get(&format!(
            "/movies/details/{}/{}/{}",
            movie_id, favorites as u8, user_id
        ))
        .await
    }

    pub async fn get_sorting_methods(&self) -> Response {
        self.get("/movies/sorting").await
    }

    pub async fn refresh_posters(&self) -> Response {
        self.get("/movies/update").await
    }

    /// Makes a GET request to an arbitrary path, for malformed route tests
    pub async fn get_raw(&self, path: &str) -> Response {
        self.get(path).await
    }

    // ========================================================================
    // Comments
    // ========================================================================

    pub async fn get_first_order_comments(
        &self,
        movie_id: i64,
        number: usize,
        offset: usize,
    ) -> Response {
        self.get(&format!(
            "/comments/getFirstOrderComments/{}/{}/{}",
            movie_id, number, offset
        ))
        .await
    }

    pub async fn get_second_order_comments(
        &self,
        movie_id: i64,
        comment_id: i64,
        number: usize,
        offset: usize,
    ) -> Response {
        self.get(&format!(
            "/comments/getSecondOrderComments/{}/{}/{}/{}",
            movie_id, comment_id, number, offset
        ))
        .await
    }

    pub async fn post_comment(
        &self,
        user_id: &str,
        movie_id: i64,
        text: &str,
        reply_comment_id: Option<i64>,
    ) -> Response {
        let body = match reply_comment_id {
            Some(reply_comment_id) => json!({ "text": text, "replyCommentId": reply_comment_id }),
            None => json!({ "text": text }),
        };
        self.post(&format!("/comments/{}/{}", user_id, movie_id), Some(body))
            .await
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn toggle_favorite(&self, user_id: &str, movie_id: i64) -> Response {
        self.post(&format!("/favorites/{}/{}", user_id, movie_id), None)
            .await
    }

    pub async fn get_favorites(&self, user_id: &str, number: usize, offset: usize) -> Response {
        self.get(&format!("/favorites/{}/{}/{}", user_id, number, offset))
            .await
    }
}
