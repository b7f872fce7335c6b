//! OMDb API client for primary movie metadata.

use super::{MetadataProvider, MovieMetadata, ProviderError};
use crate::enrichment::ExternalId;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const OMDB_API_BASE: &str = "https://www.omdbapi.com";

pub struct OmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// OMDb answers 200 even for unknown ids, signalling failures in the body.
#[derive(Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    metadata: MovieMetadata,
}

impl OmdbClient {
    pub fn new(base_url: Option<String>, api_key: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        let base_url = base_url
            .unwrap_or_else(|| OMDB_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl MetadataProvider for OmdbClient {
    async fn fetch_movie(&self, external_id: &ExternalId) -> Result<MovieMetadata, ProviderError> {
        let url = format!(
            "{}/?i={}&apikey={}",
            self.base_url,
            external_id,
            urlencoding::encode(&self.api_key)
        );
        debug!("Fetching OMDb metadata for {}", external_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: OmdbResponse = response.json().await?;
        if body.response.as_deref() == Some("False") {
            return Err(ProviderError::MalformedPayload(
                body.error
                    .unwrap_or_else(|| format!("No result for {}", external_id)),
            ));
        }
        Ok(body.metadata)
    }
}
