//! Bulk loading of movies from a JSON dump into the catalog store.

use crate::catalog_store::{CatalogStore, Movie};
use crate::enrichment::normalize::UNKNOWN_RUNTIME;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// One entry of the import file. Missing optional fields are left for the
/// enrichment engine to fill in on first read.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "posterURL")]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub votes: Option<i64>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl From<&ImportedMovie> for Movie {
    fn from(imported: &ImportedMovie) -> Self {
        Movie {
            id: imported.id,
            title: imported.title.clone(),
            year: imported.year,
            description: imported.description.clone(),
            poster_url: imported.poster_url.clone(),
            rating: imported.rating.unwrap_or(0.0),
            votes: imported.votes.unwrap_or(0),
            runtime: imported
                .runtime
                .clone()
                .unwrap_or_else(|| UNKNOWN_RUNTIME.to_string()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub genre_links: usize,
}

pub fn load_movies_file(path: &Path) -> Result<Vec<ImportedMovie>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read movies file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse movies file: {:?}", path))
}

/// Insert every movie whose id is not in the store yet and link its genres.
/// Existing movies are left untouched.
pub fn import_movies(store: &dyn CatalogStore, movies: &[ImportedMovie]) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for imported in movies {
        if imported.title.trim().is_empty() {
            warn!("Skipping movie {}: empty title", imported.id);
            report.failed += 1;
            continue;
        }
        let inserted = store
            .insert_movie(&Movie::from(imported))
            .with_context(|| format!("Failed to insert movie {}", imported.id))?;
        if !inserted {
            debug!("Movie {} already present", imported.id);
            report.skipped += 1;
            continue;
        }
        report.inserted += 1;

        for name in imported.genres.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
            let genre_id = match store.get_genre_by_name(name)? {
                Some(genre) => genre.genre_id,
                None => store.insert_genre(name)?,
            };
            if !store.get_movie_genre_link(imported.id, genre_id)? {
                store.insert_movie_genre_link(imported.id, genre_id)?;
                report.genre_links += 1;
            }
        }
    }

    Ok(report)
}
