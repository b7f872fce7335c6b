//! Third-party movie metadata providers.
//!
//! Three collaborators feed the enrichment pipeline:
//! - a primary metadata provider (OMDb) keyed by the external movie id
//! - a fallback poster provider (TMDB) keyed by the same id
//! - a person search provider (TMDB) keyed by a name

mod omdb;
mod tmdb;

pub use omdb::OmdbClient;
pub use tmdb::{TmdbClient, TMDB_IMAGE_BASE};

use crate::enrichment::ExternalId;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to a metadata provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::MalformedPayload(e.to_string())
        } else {
            ProviderError::Connection(e.to_string())
        }
    }
}

/// Raw primary metadata as returned by the provider. Every field is a
/// string, numeric fields are parsed during normalization.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MovieMetadata {
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes")]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
}

/// One hit of a person search.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PersonHit {
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch the primary metadata of a movie.
    async fn fetch_movie(&self, external_id: &ExternalId) -> Result<MovieMetadata, ProviderError>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PosterProvider: Send + Sync {
    /// Fetch the relative poster path of a movie, `None` when the provider
    /// has no poster for it.
    async fn fetch_poster_path(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<String>, ProviderError>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PersonSearchProvider: Send + Sync {
    /// Search people by name, best matches first.
    async fn search_person(&self, query: &str) -> Result<Vec<PersonHit>, ProviderError>;
}
