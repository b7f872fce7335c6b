//! Movie Import Tool
//!
//! Loads a JSON array of movies into the catalog database of a server
//! data directory. Movies already in the catalog are skipped.

use anyhow::{bail, Result};
use clap::Parser;
use movie_catalog_server::catalog_import::{import_movies, load_movies_file};
use movie_catalog_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use movie_catalog_server::config::CATALOG_DB_FILE;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-import")]
#[command(about = "Import movies from a JSON file into the catalog database")]
struct Args {
    /// Server data directory, the one passed to the server as --db-dir
    #[arg(value_name = "DB_DIR")]
    db_dir: PathBuf,

    /// JSON file holding an array of movies
    #[arg(value_name = "MOVIES_JSON")]
    movies_file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if !args.db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", args.db_dir);
    }

    let movies = load_movies_file(&args.movies_file)?;
    info!(
        "Importing {} movies from {}",
        movies.len(),
        args.movies_file.display()
    );

    let store = SqliteCatalogStore::new(args.db_dir.join(CATALOG_DB_FILE))?;
    let report = import_movies(&store, &movies)?;

    info!(
        "Import done: {} inserted, {} already present, {} rejected, {} genre links",
        report.inserted, report.skipped, report.failed, report.genre_links
    );
    info!("Catalog now holds {} movies", store.get_movies_count());
    Ok(())
}
