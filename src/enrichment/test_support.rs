//! Hand-written fakes shared by the enrichment and service unit tests.

use crate::catalog_store::{
    CatalogStore, Genre, Movie, MovieCredit, MovieQuery, Person, PersonRole, SqliteCatalogStore,
};
use crate::enrichment::ExternalId;
use crate::metadata::{
    MetadataProvider, MovieMetadata, PersonHit, PersonSearchProvider, PosterProvider,
    ProviderError,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

pub const OMDB: &str = "fetch_movie";
pub const POSTER: &str = "fetch_poster_path";
pub const PERSON: &str = "search_person";

/// In-memory implementation of the three metadata providers.
#[derive(Default)]
pub struct FakeProviders {
    movies: Mutex<HashMap<String, MovieMetadata>>,
    posters: Mutex<HashMap<String, String>>,
    people: Mutex<HashMap<String, Vec<PersonHit>>>,
    failing: Mutex<HashSet<&'static str>>,
    call_counts: Mutex<HashMap<&'static str, usize>>,
    person_queries: Mutex<Vec<String>>,
}

impl FakeProviders {
    pub fn with_movie(self, local_id: i64, metadata: MovieMetadata) -> Self {
        let id = ExternalId::try_from(local_id).unwrap().to_string();
        self.movies.lock().unwrap().insert(id, metadata);
        self
    }

    pub fn with_poster(self, local_id: i64, path: &str) -> Self {
        let id = ExternalId::try_from(local_id).unwrap().to_string();
        self.posters.lock().unwrap().insert(id, path.to_string());
        self
    }

    pub fn with_person(self, query: &str, profile_path: Option<&str>) -> Self {
        self.people.lock().unwrap().insert(
            query.to_string(),
            vec![PersonHit {
                profile_path: profile_path.map(str::to_string),
            }],
        );
        self
    }

    pub fn failing(self, method: &'static str) -> Self {
        self.failing.lock().unwrap().insert(method);
        self
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        *self.call_counts.lock().unwrap().get(method).unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.call_counts.lock().unwrap().values().sum()
    }

    pub fn person_queries(&self) -> Vec<String> {
        self.person_queries.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) -> Result<(), ProviderError> {
        *self.call_counts.lock().unwrap().entry(method).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(method) {
            return Err(ProviderError::Connection("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for FakeProviders {
    async fn fetch_movie(&self, external_id: &ExternalId) -> Result<MovieMetadata, ProviderError> {
        self.record(OMDB)?;
        self.movies
            .lock()
            .unwrap()
            .get(external_id.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::MalformedPayload("Incorrect IMDb ID.".to_string()))
    }
}

#[async_trait]
impl PosterProvider for FakeProviders {
    async fn fetch_poster_path(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<String>, ProviderError> {
        self.record(POSTER)?;
        Ok(self.posters.lock().unwrap().get(external_id.as_str()).cloned())
    }
}

#[async_trait]
impl PersonSearchProvider for FakeProviders {
    async fn search_person(&self, query: &str) -> Result<Vec<PersonHit>, ProviderError> {
        self.record(PERSON)?;
        self.person_queries.lock().unwrap().push(query.to_string());
        Ok(self
            .people
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}

/// SQLite store that counts calls and can be told to fail writes.
pub struct CountingStore {
    inner: SqliteCatalogStore,
    call_counts: Mutex<HashMap<&'static str, usize>>,
    fail_writes: AtomicBool,
}

impl CountingStore {
    pub fn new() -> (Self, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let inner = SqliteCatalogStore::new(temp_dir.path().join("catalog.db")).unwrap();
        (
            Self {
                inner,
                call_counts: Mutex::new(HashMap::new()),
                fail_writes: AtomicBool::new(false),
            },
            temp_dir,
        )
    }

    pub fn inner(&self) -> &SqliteCatalogStore {
        &self.inner
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        *self.call_counts.lock().unwrap().get(method).unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.call_counts.lock().unwrap().values().sum()
    }

    fn record(&self, method: &'static str) {
        *self.call_counts.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    fn record_write(&self, method: &'static str) -> Result<()> {
        self.record(method);
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk I/O error");
        }
        Ok(())
    }
}

impl CatalogStore for CountingStore {
    fn get_movie_by_id(&self, id: i64) -> Result<Option<Movie>> {
        self.record("get_movie_by_id");
        self.inner.get_movie_by_id(id)
    }

    fn list_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>> {
        self.record("list_movies");
        self.inner.list_movies(query)
    }

    fn update_movie(&self, movie: &Movie) -> Result<()> {
        self.record_write("update_movie")?;
        self.inner.update_movie(movie)
    }

    fn update_movie_poster(&self, id: i64, poster_url: &str) -> Result<()> {
        self.record_write("update_movie_poster")?;
        self.inner.update_movie_poster(id, poster_url)
    }

    fn insert_movie(&self, movie: &Movie) -> Result<bool> {
        self.record_write("insert_movie")?;
        self.inner.insert_movie(movie)
    }

    fn list_movies_missing_poster(&self, limit: usize) -> Result<Vec<Movie>> {
        self.record("list_movies_missing_poster");
        self.inner.list_movies_missing_poster(limit)
    }

    fn get_movies_count(&self) -> usize {
        self.record("get_movies_count");
        self.inner.get_movies_count()
    }

    fn get_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.record("get_genre_by_name");
        self.inner.get_genre_by_name(name)
    }

    fn insert_genre(&self, name: &str) -> Result<i64> {
        self.record_write("insert_genre")?;
        self.inner.insert_genre(name)
    }

    fn get_movie_genre_link(&self, movie_id: i64, genre_id: i64) -> Result<bool> {
        self.record("get_movie_genre_link");
        self.inner.get_movie_genre_link(movie_id, genre_id)
    }

    fn insert_movie_genre_link(&self, movie_id: i64, genre_id: i64) -> Result<()> {
        self.record_write("insert_movie_genre_link")?;
        self.inner.insert_movie_genre_link(movie_id, genre_id)
    }

    fn get_genres_by_movie_id(&self, movie_id: i64) -> Result<Vec<Genre>> {
        self.record("get_genres_by_movie_id");
        self.inner.get_genres_by_movie_id(movie_id)
    }

    fn get_person_by_name(&self, name: &str) -> Result<Option<Person>> {
        self.record("get_person_by_name");
        self.inner.get_person_by_name(name)
    }

    fn insert_person(&self, name: &str, photo_url: Option<&str>) -> Result<i64> {
        self.record_write("insert_person")?;
        self.inner.insert_person(name, photo_url)
    }

    fn update_person_photo(&self, person_id: i64, photo_url: &str) -> Result<()> {
        self.record_write("update_person_photo")?;
        self.inner.update_person_photo(person_id, photo_url)
    }

    fn get_movie_person_link(
        &self,
        movie_id: i64,
        person_id: i64,
        role: PersonRole,
    ) -> Result<bool> {
        self.record("get_movie_person_link");
        self.inner.get_movie_person_link(movie_id, person_id, role)
    }

    fn insert_movie_person_link(
        &self,
        movie_id: i64,
        person_id: i64,
        role: PersonRole,
        position: usize,
    ) -> Result<()> {
        self.record_write("insert_movie_person_link")?;
        self.inner
            .insert_movie_person_link(movie_id, person_id, role, position)
    }

    fn get_people_by_movie_id(&self, movie_id: i64) -> Result<Vec<MovieCredit>> {
        self.record("get_people_by_movie_id");
        self.inner.get_people_by_movie_id(movie_id)
    }
}

pub fn stale_movie(id: i64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        year: Some(2000),
        description: None,
        poster_url: None,
        rating: 0.0,
        votes: 0,
        runtime: "0 min".to_string(),
    }
}

pub fn complete_movie(id: i64, title: &str) -> Movie {
    Movie {
        description: Some("stored description".to_string()),
        poster_url: Some("stored poster".to_string()),
        ..stale_movie(id, title)
    }
}

pub fn sample_metadata() -> MovieMetadata {
    MovieMetadata {
        plot: Some("plot".to_string()),
        poster: Some("poster".to_string()),
        genre: Some("Drama, Comedy".to_string()),
        director: Some("Jane Director".to_string()),
        actors: Some("John Actor, Mary Star".to_string()),
        imdb_rating: Some("6.0".to_string()),
        imdb_votes: Some("45,000".to_string()),
        runtime: Some("8 min".to_string()),
    }
}
