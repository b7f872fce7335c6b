use super::RequestsLoggingLevel;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub content_cache_age_sec: usize,
    /// Secret used to verify HS256 tokens on user routes.
    /// `None` disables token validation.
    pub jwt_secret: Option<String>,
    /// How many movies a single poster refresh run looks at.
    pub poster_refresh_batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            content_cache_age_sec: 3600,
            jwt_secret: None,
            poster_refresh_batch_size: 500,
        }
    }
}
