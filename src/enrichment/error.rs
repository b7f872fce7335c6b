use crate::metadata::ProviderError;
use thiserror::Error;

/// Errors surfaced by the enrichment pipeline.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The local id cannot be turned into an external id.
    #[error("Invalid id format: {0}")]
    InvalidIdFormat(String),

    /// A metadata provider failed. Not retried, callers serve stored data.
    #[error("Third party provider {provider} unavailable: {source}")]
    ThirdPartyUnavailable {
        provider: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error("Movie not found")]
    NotFound,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl EnrichmentError {
    pub(crate) fn unavailable(provider: &'static str) -> impl FnOnce(ProviderError) -> Self {
        move |source| EnrichmentError::ThirdPartyUnavailable { provider, source }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichmentError::InvalidIdFormat(_) => "invalid_id",
            EnrichmentError::ThirdPartyUnavailable { .. } => "third_party_unavailable",
            EnrichmentError::NotFound => "not_found",
            EnrichmentError::Store(_) => "store",
        }
    }
}
