mod file_config;

pub use file_config::{AuthConfig, FileConfig, ProvidersConfig};

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const CATALOG_DB_FILE: &str = "catalog.db";
pub const USER_DB_FILE: &str = "user.db";
pub const DEFAULT_PROVIDER_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_POSTER_REFRESH_BATCH_SIZE: usize = 500;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub omdb_api_key: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub provider_timeout_sec: u64,
    pub jwt_validation: bool,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub poster_refresh_batch_size: usize,
    pub providers: ProviderSettings,
    /// Present only when token validation is enabled.
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub omdb_api_key: String,
    pub tmdb_api_key: String,
    pub omdb_base_url: Option<String>,
    pub tmdb_base_url: Option<String>,
    pub timeout_sec: u64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| anyhow!("db_dir must be specified via --db-dir or in config file"))?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ, both are {}", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);
        let poster_refresh_batch_size = file
            .poster_refresh_batch_size
            .unwrap_or(DEFAULT_POSTER_REFRESH_BATCH_SIZE);

        let providers_file = file.providers.unwrap_or_default();
        let omdb_api_key = providers_file
            .omdb_api_key
            .or_else(|| cli.omdb_api_key.clone())
            .ok_or_else(|| {
                anyhow!("omdb_api_key must be specified via --omdb-api-key, OMDB_API_KEY or [providers]")
            })?;
        let tmdb_api_key = providers_file
            .tmdb_api_key
            .or_else(|| cli.tmdb_api_key.clone())
            .ok_or_else(|| {
                anyhow!("tmdb_api_key must be specified via --tmdb-api-key, TMDB_API_KEY or [providers]")
            })?;
        let timeout_sec = providers_file.timeout_sec.unwrap_or(if cli.provider_timeout_sec > 0 {
            cli.provider_timeout_sec
        } else {
            DEFAULT_PROVIDER_TIMEOUT_SEC
        });
        let providers = ProviderSettings {
            omdb_api_key,
            tmdb_api_key,
            omdb_base_url: providers_file.omdb_base_url,
            tmdb_base_url: providers_file.tmdb_base_url,
            timeout_sec,
        };

        let auth_file = file.auth.unwrap_or_default();
        let jwt_validation = auth_file.jwt_validation.unwrap_or(cli.jwt_validation);
        let jwt_secret = if jwt_validation {
            let secret = auth_file
                .jwt_secret
                .or_else(|| cli.jwt_secret.clone())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    anyhow!("jwt_secret must be specified when token validation is enabled")
                })?;
            Some(secret)
        } else {
            None
        };

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            content_cache_age_sec,
            poster_refresh_batch_size,
            providers,
            jwt_secret,
        })
    }

    pub fn catalog_db_path(&self) -> PathBuf {
        self.db_dir.join(CATALOG_DB_FILE)
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join(USER_DB_FILE)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            content_cache_age_sec: self.content_cache_age_sec,
            jwt_secret: self.jwt_secret.clone(),
            poster_refresh_batch_size: self.poster_refresh_batch_size,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
