//! Test fixtures: the seeded catalog and a fake metadata provider
//!
//! The fake provider speaks both the OMDb and the TMDB wire formats on a
//! single local port, so the real clients can be pointed at it.

use super::constants::*;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use movie_catalog_server::catalog_store::{CatalogStore, Movie, SqliteCatalogStore};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Creates a temporary catalog with one complete and three stale movies
/// Returns (temp_dir, catalog_db_path)
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let catalog_db_path = dir.path().join("catalog.db");
    let store = SqliteCatalogStore::new(&catalog_db_path)?;

    store.insert_movie(&Movie {
        id: COMPLETE_MOVIE_ID,
        title: COMPLETE_MOVIE_TITLE.to_string(),
        year: Some(1999),
        description: Some(COMPLETE_MOVIE_DESCRIPTION.to_string()),
        poster_url: Some(COMPLETE_MOVIE_POSTER.to_string()),
        rating: 7.5,
        votes: 1200,
        runtime: "120 min".to_string(),
    })?;
    let drama = store.insert_genre(DRAMA_GENRE)?;
    store.insert_movie_genre_link(COMPLETE_MOVIE_ID, drama)?;

    for (id, title, year, description, poster_url) in [
        (STALE_MOVIE_ID, STALE_MOVIE_TITLE, 2005, None, None),
        (UNKNOWN_MOVIE_ID, UNKNOWN_MOVIE_TITLE, 2010, None, None),
        (
            POSTERLESS_MOVIE_ID,
            POSTERLESS_MOVIE_TITLE,
            2015,
            Some("Stored plot"),
            Some("N/A"),
        ),
    ] {
        store.insert_movie(&Movie {
            id,
            title: title.to_string(),
            year: Some(year),
            description: description.map(str::to_string),
            poster_url: poster_url.map(str::to_string),
            rating: 0.0,
            votes: 0,
            runtime: "0 min".to_string(),
        })?;
    }

    Ok((dir, catalog_db_path))
}

#[derive(Default)]
struct ProviderCalls {
    movie: AtomicUsize,
    poster: AtomicUsize,
    person: AtomicUsize,
}

/// Local stand-in for the third-party metadata providers
pub struct FakeProviderServer {
    pub base_url: String,
    calls: Arc<ProviderCalls>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

fn external_id(local_id: i64) -> String {
    format!("tt{:07}", local_id)
}

async fn fake_omdb(
    State(calls): State<Arc<ProviderCalls>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    calls.movie.fetch_add(1, Ordering::SeqCst);
    let id = params.get("i").cloned().unwrap_or_default();

    if id == external_id(STALE_MOVIE_ID) {
        Json(json!({
            "Title": STALE_MOVIE_TITLE,
            "Plot": STALE_MOVIE_PLOT,
            "Poster": STALE_MOVIE_PROVIDER_POSTER,
            "Genre": STALE_MOVIE_GENRES,
            "Director": STALE_MOVIE_DIRECTOR,
            "Actors": STALE_MOVIE_ACTORS,
            "imdbRating": "8.2",
            "imdbVotes": "45,000",
            "Runtime": "98 min",
            "Response": "True"
        }))
    } else if id == external_id(POSTERLESS_MOVIE_ID) {
        Json(json!({
            "Title": POSTERLESS_MOVIE_TITLE,
            "Plot": "N/A",
            "Poster": "N/A",
            "Genre": "Horror",
            "Director": "N/A",
            "Actors": "N/A",
            "imdbRating": "N/A",
            "imdbVotes": "N/A",
            "Runtime": "N/A",
            "Response": "True"
        }))
    } else {
        Json(json!({ "Response": "False", "Error": "Incorrect IMDb ID." }))
    }
}

async fn fake_tmdb_movie(
    State(calls): State<Arc<ProviderCalls>>,
    Path(id): Path<String>,
) -> Response {
    calls.poster.fetch_add(1, Ordering::SeqCst);
    if id == external_id(POSTERLESS_MOVIE_ID) {
        Json(json!({ "poster_path": FALLBACK_POSTER_PATH })).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn fake_tmdb_person_search(
    State(calls): State<Arc<ProviderCalls>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    calls.person.fetch_add(1, Ordering::SeqCst);
    match params.get("query").map(String::as_str) {
        Some("Doe") => Json(json!({
            "results": [{ "profile_path": null }, { "profile_path": DOE_PROFILE_PATH }]
        })),
        _ => Json(json!({ "results": [] })),
    }
}

impl FakeProviderServer {
    pub async fn spawn() -> Self {
        let calls = Arc::new(ProviderCalls::default());
        let app = Router::new()
            .route("/", get(fake_omdb))
            .route("/movie/{id}", get(fake_tmdb_movie))
            .route("/search/person", get(fake_tmdb_person_search))
            .with_state(calls.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake provider port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake provider failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            calls,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn movie_calls(&self) -> usize {
        self.calls.movie.load(Ordering::SeqCst)
    }

    pub fn poster_calls(&self) -> usize {
        self.calls.poster.load(Ordering::SeqCst)
    }

    pub fn person_calls(&self) -> usize {
        self.calls.person.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.movie_calls() + self.poster_calls() + self.person_calls()
    }
}

impl Drop for FakeProviderServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
