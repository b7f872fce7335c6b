//! CatalogStore trait definition.

use super::models::{Genre, Movie, MovieCredit, MovieQuery, Person, PersonRole};
use anyhow::Result;

/// Trait for movie catalog storage backends.
///
/// Methods are synchronous, callers in async context hold no await point
/// while a call is in progress.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Movies
    // =========================================================================

    /// Get a movie by its store-local id.
    fn get_movie_by_id(&self, id: i64) -> Result<Option<Movie>>;

    /// List movies applying sorting, pagination, genre and title filters.
    fn list_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>>;

    /// Overwrite the enrichable fields of a movie (description, poster,
    /// rating, votes, runtime). Title and year are left untouched.
    fn update_movie(&self, movie: &Movie) -> Result<()>;

    /// Set only the poster of a movie.
    fn update_movie_poster(&self, id: i64, poster_url: &str) -> Result<()>;

    /// Insert a new movie. Returns false if a movie with the same id exists.
    fn insert_movie(&self, movie: &Movie) -> Result<bool>;

    /// Movies whose poster is NULL or "N/A", lowest ids first.
    fn list_movies_missing_poster(&self, limit: usize) -> Result<Vec<Movie>>;

    fn get_movies_count(&self) -> usize;

    // =========================================================================
    // Genres
    // =========================================================================

    /// Exact, case-sensitive lookup.
    fn get_genre_by_name(&self, name: &str) -> Result<Option<Genre>>;

    /// Insert a genre and return its id.
    fn insert_genre(&self, name: &str) -> Result<i64>;

    fn get_movie_genre_link(&self, movie_id: i64, genre_id: i64) -> Result<bool>;

    fn insert_movie_genre_link(&self, movie_id: i64, genre_id: i64) -> Result<()>;

    /// Genres of a movie in insertion order.
    fn get_genres_by_movie_id(&self, movie_id: i64) -> Result<Vec<Genre>>;

    // =========================================================================
    // People
    // =========================================================================

    /// Lookup by full name.
    fn get_person_by_name(&self, name: &str) -> Result<Option<Person>>;

    /// Insert a person and return its id.
    fn insert_person(&self, name: &str, photo_url: Option<&str>) -> Result<i64>;

    /// Set the photo of a person that had none.
    fn update_person_photo(&self, person_id: i64, photo_url: &str) -> Result<()>;

    fn get_movie_person_link(&self, movie_id: i64, person_id: i64, role: PersonRole)
        -> Result<bool>;

    fn insert_movie_person_link(
        &self,
        movie_id: i64,
        person_id: i64,
        role: PersonRole,
        position: usize,
    ) -> Result<()>;

    /// Credits of a movie, directors and actors in credit order.
    fn get_people_by_movie_id(&self, movie_id: i64) -> Result<Vec<MovieCredit>>;
}
