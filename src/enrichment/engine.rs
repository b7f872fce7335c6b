//! Movie repair: fills in stale records from the metadata providers and
//! writes the merged result back to the catalog.

use super::normalize::{normalize, person_search_key};
use super::{EnrichmentError, ExternalId};
use crate::catalog_store::{
    has_usable_image, CatalogStore, Movie, MovieDetails, PersonRole, PersonSummary, NOT_AVAILABLE,
};
use crate::metadata::{MetadataProvider, PersonSearchProvider, PosterProvider, TMDB_IMAGE_BASE};
use crate::server::metrics::record_enrichment;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const OMDB_PROVIDER: &str = "omdb";
const TMDB_PROVIDER: &str = "tmdb";

pub struct EnrichmentEngine {
    catalog_store: Arc<dyn CatalogStore>,
    metadata_provider: Arc<dyn MetadataProvider>,
    poster_provider: Arc<dyn PosterProvider>,
    person_search: Arc<dyn PersonSearchProvider>,
}

/// A credit resolved during repair, in provider order.
struct ResolvedCredit {
    summary: PersonSummary,
    role: PersonRole,
    position: usize,
}

impl EnrichmentEngine {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        metadata_provider: Arc<dyn MetadataProvider>,
        poster_provider: Arc<dyn PosterProvider>,
        person_search: Arc<dyn PersonSearchProvider>,
    ) -> Self {
        Self {
            catalog_store,
            metadata_provider,
            poster_provider,
            person_search,
        }
    }

    /// Ensure a movie is complete, fetching and persisting missing data if needed.
    ///
    /// Complete movies are returned as they are, without touching providers or
    /// the store. Stale movies are merged with the provider metadata, written
    /// back, and returned even if the write-back failed.
    pub async fn repair(&self, movie: Movie) -> Result<MovieDetails, EnrichmentError> {
        if movie.is_complete() {
            record_enrichment("complete");
            return Ok(MovieDetails::without_credits(movie));
        }

        let result = self.repair_stale(movie).await;
        match &result {
            Ok(_) => record_enrichment("repaired"),
            Err(e) => record_enrichment(e.kind()),
        }
        result
    }

    /// Load a movie by id and repair it.
    pub async fn repair_by_id(&self, id: i64) -> Result<MovieDetails, EnrichmentError> {
        let movie = self
            .catalog_store
            .get_movie_by_id(id)?
            .ok_or(EnrichmentError::NotFound)?;
        self.repair(movie).await
    }

    async fn repair_stale(&self, movie: Movie) -> Result<MovieDetails, EnrichmentError> {
        let external_id = ExternalId::try_from(movie.id)?;
        info!("Movie {} ({}) is incomplete, repairing", movie.id, external_id);

        let metadata = self
            .metadata_provider
            .fetch_movie(&external_id)
            .await
            .map_err(EnrichmentError::unavailable(OMDB_PROVIDER))?;
        let normalized = normalize(metadata);

        let poster_url = if has_usable_image(Some(normalized.poster_url.as_str())) {
            normalized.poster_url
        } else {
            let fallback = self.fallback_poster(&external_id).await?;
            if !has_usable_image(Some(fallback.as_str()))
                && has_usable_image(movie.poster_url.as_deref())
            {
                // Keep what we had rather than downgrade to "N/A"
                movie.poster_url.clone().unwrap_or_default()
            } else {
                fallback
            }
        };

        // No plot anywhere is stored as "N/A", which still completes the record
        let description = normalized
            .description
            .or(movie.description.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let merged = Movie {
            description: Some(description),
            poster_url: Some(poster_url),
            rating: normalized.rating,
            votes: normalized.votes,
            runtime: normalized.runtime,
            ..movie
        };

        let mut credits = vec![];
        let mut photos: HashMap<String, String> = HashMap::new();
        for (role, names) in [
            (PersonRole::Director, &normalized.directors),
            (PersonRole::Actor, &normalized.actors),
        ] {
            for (position, name) in names.iter().enumerate() {
                let photo_url = match photos.get(name) {
                    Some(photo) => photo.clone(),
                    None => {
                        let photo = self.resolve_photo(name).await?;
                        photos.insert(name.clone(), photo.clone());
                        photo
                    }
                };
                credits.push(ResolvedCredit {
                    summary: PersonSummary {
                        name: name.clone(),
                        photo_url: Some(photo_url),
                    },
                    role,
                    position,
                });
            }
        }

        if let Err(e) = self.write_back(&merged, &normalized.genres, &credits) {
            warn!("Failed to write back repaired movie {}: {:#}", merged.id, e);
        }

        let (directors, actors): (Vec<_>, Vec<_>) = credits
            .into_iter()
            .partition(|credit| credit.role == PersonRole::Director);
        Ok(MovieDetails {
            movie: merged,
            genres: normalized.genres,
            directors: directors.into_iter().map(|c| c.summary).collect(),
            actors: actors.into_iter().map(|c| c.summary).collect(),
        })
    }

    /// Poster from the fallback provider as a full url, "N/A" if it has none.
    async fn fallback_poster(&self, external_id: &ExternalId) -> Result<String, EnrichmentError> {
        let path = self
            .poster_provider
            .fetch_poster_path(external_id)
            .await
            .map_err(EnrichmentError::unavailable(TMDB_PROVIDER))?;
        Ok(match path {
            Some(path) => format!("{}{}", TMDB_IMAGE_BASE, path),
            None => {
                debug!("No fallback poster for {}", external_id);
                NOT_AVAILABLE.to_string()
            }
        })
    }

    /// Photo of a person: the stored one if present, otherwise the first
    /// search hit with a profile picture, otherwise "N/A".
    async fn resolve_photo(&self, name: &str) -> Result<String, EnrichmentError> {
        match self.catalog_store.get_person_by_name(name) {
            Ok(Some(person)) => {
                if let Some(photo) = person.photo_url {
                    return Ok(photo);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to look up person '{}': {:#}", name, e),
        }

        let hits = self
            .person_search
            .search_person(person_search_key(name))
            .await
            .map_err(EnrichmentError::unavailable(TMDB_PROVIDER))?;
        Ok(hits
            .into_iter()
            .find_map(|hit| hit.profile_path)
            .map(|path| format!("{}{}", TMDB_IMAGE_BASE, path))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()))
    }

    fn write_back(&self, movie: &Movie, genres: &[String], credits: &[ResolvedCredit]) -> Result<()> {
        let store = &self.catalog_store;
        store.update_movie(movie)?;

        for name in genres {
            let genre_id = match store.get_genre_by_name(name)? {
                Some(genre) => genre.genre_id,
                None => store.insert_genre(name)?,
            };
            if !store.get_movie_genre_link(movie.id, genre_id)? {
                store.insert_movie_genre_link(movie.id, genre_id)?;
            }
        }

        for credit in credits {
            let name = &credit.summary.name;
            let photo_url = credit.summary.photo_url.as_deref();
            let person_id = match store.get_person_by_name(name)? {
                Some(person) => {
                    if let (None, Some(photo)) = (&person.photo_url, photo_url) {
                        store.update_person_photo(person.person_id, photo)?;
                    }
                    person.person_id
                }
                None => store.insert_person(name, photo_url)?,
            };
            if !store.get_movie_person_link(movie.id, person_id, credit.role)? {
                store.insert_movie_person_link(movie.id, person_id, credit.role, credit.position)?;
            }
        }

        info!(
            "Movie {} repaired: {} genres, {} credits",
            movie.id,
            genres.len(),
            credits.len()
        );
        Ok(())
    }

    /// Try to replace a missing poster using the fallback provider only.
    /// Returns the new poster url if one was found and stored.
    pub async fn refresh_poster(&self, movie: &Movie) -> Result<Option<String>, EnrichmentError> {
        if has_usable_image(movie.poster_url.as_deref()) {
            return Ok(None);
        }
        let external_id = ExternalId::try_from(movie.id)?;
        let poster_url = self.fallback_poster(&external_id).await?;
        if !has_usable_image(Some(poster_url.as_str())) {
            return Ok(None);
        }
        self.catalog_store
            .update_movie_poster(movie.id, &poster_url)?;
        Ok(Some(poster_url))
    }
}
