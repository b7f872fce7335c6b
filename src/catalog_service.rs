//! Movie listing, search and details, repairing stale rows on the way out.

use crate::catalog_store::{CatalogStore, Movie, MovieDetails, MovieQuery, SortField};
use crate::enrichment::{EnrichmentEngine, EnrichmentError};
use crate::user_content::{Comment, NewComment, UserContentStore};
use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a details lookup.
#[derive(Debug, PartialEq)]
pub enum DetailsResult<T = MovieDetails> {
    Found(T),
    NotFound,
}

impl<T> DetailsResult<T> {
    pub fn not_found_message() -> String {
        EnrichmentError::NotFound.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieDetailsWithFavorites {
    #[serde(flatten)]
    pub details: MovieDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SortingOptions {
    #[serde(rename = "sortingOptions")]
    pub sorting_options: Vec<&'static str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PosterRefreshReport {
    pub checked: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PostCommentResult {
    Posted(i64),
    MovieNotFound,
    ReplyTargetNotFound,
}

pub struct CatalogService {
    catalog_store: Arc<dyn CatalogStore>,
    user_content_store: Arc<dyn UserContentStore>,
    engine: Arc<EnrichmentEngine>,
}

impl CatalogService {
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        user_content_store: Arc<dyn UserContentStore>,
        engine: Arc<EnrichmentEngine>,
    ) -> Self {
        Self {
            catalog_store,
            user_content_store,
            engine,
        }
    }

    /// List movies, repairing the incomplete ones. Store order is preserved.
    pub async fn list_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>> {
        let movies = self.catalog_store.list_movies(query)?;
        Ok(self.repair_all(movies).await)
    }

    /// Same as [`Self::list_movies`] restricted to titles containing `name`.
    pub async fn search_movies(&self, query: &MovieQuery, name: &str) -> Result<Vec<Movie>> {
        let query = MovieQuery {
            title_contains: Some(name.to_string()),
            ..query.clone()
        };
        self.list_movies(&query).await
    }

    async fn repair_all(&self, movies: Vec<Movie>) -> Vec<Movie> {
        join_all(movies.into_iter().map(|movie| async move {
            if movie.is_complete() {
                return movie;
            }
            match self.engine.repair(movie.clone()).await {
                Ok(details) => details.movie,
                Err(e) => {
                    warn!("Serving stored data for movie {}: {}", movie.id, e);
                    movie
                }
            }
        }))
        .await
    }

    pub async fn movie_details(&self, id: i64) -> Result<DetailsResult> {
        let Some(movie) = self.catalog_store.get_movie_by_id(id)? else {
            return Ok(DetailsResult::NotFound);
        };

        if !movie.is_complete() {
            match self.engine.repair(movie.clone()).await {
                Ok(details) => return Ok(DetailsResult::Found(details)),
                Err(e) => warn!("Serving stored data for movie {}: {}", id, e),
            }
        }

        let genres = self.catalog_store.get_genres_by_movie_id(id)?;
        let credits = self.catalog_store.get_people_by_movie_id(id)?;
        Ok(DetailsResult::Found(MovieDetails::from_stored(
            movie, genres, credits,
        )))
    }

    /// Details plus whether the movie is one of the user's favorites, the
    /// flag is only added when requested and the movie exists.
    pub async fn movie_details_with_favorites(
        &self,
        id: i64,
        include_favorites: bool,
        user_id: &str,
    ) -> Result<DetailsResult<MovieDetailsWithFavorites>> {
        let details = match self.movie_details(id).await? {
            DetailsResult::Found(details) => details,
            DetailsResult::NotFound => return Ok(DetailsResult::NotFound),
        };
        let favorites = if include_favorites {
            Some(self.user_content_store.is_movie_in_favorites(user_id, id)?)
        } else {
            None
        };
        Ok(DetailsResult::Found(MovieDetailsWithFavorites {
            details,
            favorites,
        }))
    }

    pub fn sorting_methods(&self) -> SortingOptions {
        SortingOptions {
            sorting_options: SortField::ALL.iter().map(SortField::as_str).collect(),
        }
    }

    /// Look for movies without a poster and try the fallback provider for
    /// each of them.
    pub async fn refresh_missing_posters(&self, batch_size: usize) -> Result<PosterRefreshReport> {
        let movies = self.catalog_store.list_movies_missing_poster(batch_size)?;
        let mut report = PosterRefreshReport {
            checked: movies.len(),
            ..Default::default()
        };
        for movie in &movies {
            match self.engine.refresh_poster(movie).await {
                Ok(Some(_)) => report.updated += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to refresh poster of movie {}: {}", movie.id, e);
                    report.failed += 1;
                }
            }
        }
        info!(
            "Poster refresh done: {} checked, {} updated, {} failed",
            report.checked, report.updated, report.failed
        );
        Ok(report)
    }

    // =========================================================================
    // User content
    // =========================================================================

    pub fn first_order_comments(
        &self,
        movie_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>> {
        self.user_content_store
            .get_first_order_comments(movie_id, limit, offset)
    }

    pub fn second_order_comments(
        &self,
        movie_id: i64,
        comment_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>> {
        self.user_content_store
            .get_second_order_comments(movie_id, comment_id, limit, offset)
    }

    pub fn post_comment(
        &self,
        user_id: &str,
        movie_id: i64,
        comment: &NewComment,
    ) -> Result<PostCommentResult> {
        if self.catalog_store.get_movie_by_id(movie_id)?.is_none() {
            return Ok(PostCommentResult::MovieNotFound);
        }
        let posted = self.user_content_store.post_comment(
            user_id,
            movie_id,
            comment.reply_comment_id,
            &comment.text,
        )?;
        Ok(match posted {
            Some(comment_id) => PostCommentResult::Posted(comment_id),
            None => PostCommentResult::ReplyTargetNotFound,
        })
    }

    /// Toggle a favorite, `None` if the movie does not exist.
    pub fn toggle_favorite(&self, user_id: &str, movie_id: i64) -> Result<Option<bool>> {
        if self.catalog_store.get_movie_by_id(movie_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(
            self.user_content_store.toggle_favorite(user_id, movie_id)?,
        ))
    }

    pub fn favorite_movies(&self, user_id: &str, limit: usize, offset: usize) -> Result<Vec<Movie>> {
        let ids = self
            .user_content_store
            .get_favorite_movie_ids(user_id, limit, offset)?;
        let mut movies = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(movie) = self.catalog_store.get_movie_by_id(id)? {
                movies.push(movie);
            }
        }
        Ok(movies)
    }
}
