//! TMDB API client, used for fallback posters and people photos.

use super::{PersonHit, PersonSearchProvider, PosterProvider, ProviderError};
use crate::enrichment::ExternalId;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

/// Prefix turning a TMDB relative image path into a full url.
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TmdbMovie {
    poster_path: Option<String>,
}

#[derive(Deserialize)]
struct TmdbPersonSearch {
    #[serde(default)]
    results: Vec<PersonHit>,
}

impl TmdbClient {
    pub fn new(base_url: Option<String>, api_key: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        let base_url = base_url
            .unwrap_or_else(|| TMDB_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        Ok(self.client.get(url).send().await?)
    }
}

async fn status_error(response: reqwest::Response) -> ProviderError {
    ProviderError::Status {
        status: response.status().as_u16(),
        message: response.text().await.unwrap_or_default(),
    }
}

#[async_trait]
impl PosterProvider for TmdbClient {
    async fn fetch_poster_path(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/movie/{}?api_key={}",
            self.base_url,
            external_id,
            urlencoding::encode(&self.api_key)
        );
        debug!("Fetching TMDB poster for {}", external_id);
        let response = self.get(&url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let movie: TmdbMovie = response.json().await?;
        Ok(movie.poster_path.filter(|path| !path.is_empty()))
    }
}

#[async_trait]
impl PersonSearchProvider for TmdbClient {
    async fn search_person(&self, query: &str) -> Result<Vec<PersonHit>, ProviderError> {
        let url = format!(
            "{}/search/person?api_key={}&query={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query)
        );
        debug!("Searching TMDB people for '{}'", query);
        let response = self.get(&url).await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let search: TmdbPersonSearch = response.json().await?;
        Ok(search.results)
    }
}
