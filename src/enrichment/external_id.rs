use super::EnrichmentError;
use std::fmt;
use std::str::FromStr;

/// Largest store-local id that fits the seven digit external format.
pub const MAX_LOCAL_ID: i64 = 9_999_999;

const EXTERNAL_ID_PREFIX: &str = "tt";
const EXTERNAL_ID_DIGITS: usize = 7;

/// Movie identifier in the format expected by the primary metadata
/// provider: "tt" followed by the zero-padded local id, e.g. `tt0012546`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<i64> for ExternalId {
    type Error = EnrichmentError;

    fn try_from(local_id: i64) -> Result<Self, Self::Error> {
        if !(0..=MAX_LOCAL_ID).contains(&local_id) {
            return Err(EnrichmentError::InvalidIdFormat(local_id.to_string()));
        }
        Ok(ExternalId(format!(
            "{}{:0width$}",
            EXTERNAL_ID_PREFIX,
            local_id,
            width = EXTERNAL_ID_DIGITS
        )))
    }
}

impl FromStr for ExternalId {
    type Err = EnrichmentError;

    /// Parses a decimal local id, e.g. "12546".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EnrichmentError::InvalidIdFormat(s.to_string()));
        }
        let local_id = s
            .parse::<i64>()
            .map_err(|_| EnrichmentError::InvalidIdFormat(s.to_string()))?;
        ExternalId::try_from(local_id)
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
