mod engine;
mod error;
mod external_id;
pub mod normalize;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::EnrichmentEngine;
pub use error::EnrichmentError;
pub use external_id::{ExternalId, MAX_LOCAL_ID};
