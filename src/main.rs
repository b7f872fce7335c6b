use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_catalog_server::catalog_service::CatalogService;
use movie_catalog_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use movie_catalog_server::config::{AppConfig, CliConfig, FileConfig};
use movie_catalog_server::enrichment::EnrichmentEngine;
use movie_catalog_server::metadata::{OmdbClient, TmdbClient};
use movie_catalog_server::server::{self, run_server, RequestsLoggingLevel};
use movie_catalog_server::user_content::SqliteUserContentStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding catalog.db and user.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override command line ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of cacheable catalog responses in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// API key of the primary metadata provider (OMDb).
    #[clap(long, env = "OMDB_API_KEY", hide_env_values = true)]
    pub omdb_api_key: Option<String>,

    /// API key of the poster and person search provider (TMDB).
    #[clap(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,

    /// Timeout in seconds for metadata provider requests.
    #[clap(long, default_value_t = 10)]
    pub provider_timeout_sec: u64,

    /// Require a token issued to the user on user routes.
    #[clap(long)]
    pub jwt_validation: bool,

    /// HS256 secret used to verify user tokens.
    #[clap(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
            omdb_api_key: self.omdb_api_key.clone(),
            tmdb_api_key: self.tmdb_api_key.clone(),
            provider_timeout_sec: self.provider_timeout_sec,
            jwt_validation: self.jwt_validation,
            jwt_secret: self.jwt_secret.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!(
        "Opening SQLite catalog database at {:?}...",
        config.catalog_db_path()
    );
    let catalog_store = Arc::new(SqliteCatalogStore::new(config.catalog_db_path())?);
    info!(
        "Opening SQLite user database at {:?}...",
        config.user_db_path()
    );
    let user_content_store = Arc::new(SqliteUserContentStore::new(config.user_db_path())?);

    info!("Initializing metrics...");
    server::metrics::init_metrics();
    server::metrics::init_catalog_metrics(catalog_store.get_movies_count());

    let providers = &config.providers;
    let omdb = Arc::new(OmdbClient::new(
        providers.omdb_base_url.clone(),
        providers.omdb_api_key.clone(),
        providers.timeout_sec,
    )?);
    let tmdb = Arc::new(TmdbClient::new(
        providers.tmdb_base_url.clone(),
        providers.tmdb_api_key.clone(),
        providers.timeout_sec,
    )?);

    let engine = Arc::new(EnrichmentEngine::new(
        catalog_store.clone(),
        omdb,
        tmdb.clone(),
        tmdb,
    ));
    let catalog_service = Arc::new(CatalogService::new(
        catalog_store,
        user_content_store,
        engine,
    ));

    if config.jwt_secret.is_none() {
        info!("Token validation is disabled");
    }

    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(e) = server::metrics::run_metrics_server(metrics_port).await {
            error!("Metrics server stopped: {:#}", e);
        }
    });

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(config.server_config(), catalog_service).await
}
