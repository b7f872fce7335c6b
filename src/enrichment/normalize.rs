//! Normalization of raw provider metadata into catalog values.
//!
//! Providers return every field as a string and use "N/A" for unknown
//! values. Numeric fields never fail: unparseable input becomes zero.

use crate::catalog_store::NOT_AVAILABLE;
use crate::metadata::MovieMetadata;

pub const UNKNOWN_RUNTIME: &str = "0 min";

/// Metadata with typed and cleaned fields.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedMetadata {
    /// `None` when the provider has no plot, the stored one is kept then.
    pub description: Option<String>,
    /// Poster url or "N/A".
    pub poster_url: String,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub rating: f64,
    pub votes: i64,
    pub runtime: String,
}

pub fn normalize(raw: MovieMetadata) -> NormalizedMetadata {
    NormalizedMetadata {
        description: raw
            .plot
            .map(|plot| plot.trim().to_string())
            .filter(|plot| !plot.is_empty() && plot != NOT_AVAILABLE),
        poster_url: raw
            .poster
            .map(|poster| poster.trim().to_string())
            .filter(|poster| !poster.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        genres: split_list(raw.genre.as_deref()),
        directors: split_list(raw.director.as_deref()),
        actors: split_list(raw.actors.as_deref()),
        rating: parse_rating(raw.imdb_rating.as_deref()),
        votes: parse_votes(raw.imdb_votes.as_deref()),
        runtime: normalize_runtime(raw.runtime.as_deref()),
    }
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    match value.map(str::trim) {
        None | Some(NOT_AVAILABLE) => vec![],
        Some(value) => value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

pub fn parse_rating(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|rating| rating.is_finite())
        .unwrap_or(0.0)
}

/// Parses a vote count, thousands separators included ("45,000").
pub fn parse_votes(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().replace(',', "").parse::<i64>().ok())
        .unwrap_or(0)
}

/// Keeps the leading minute count, e.g. "142 min" or "142", as "<n> min".
pub fn normalize_runtime(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim) else {
        return UNKNOWN_RUNTIME.to_string();
    };
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(minutes) => format!("{} min", minutes),
        Err(_) => UNKNOWN_RUNTIME.to_string(),
    }
}

/// Name used to search a person photo: the token after the first space,
/// or the whole name for single-word names.
pub fn person_search_key(name: &str) -> &str {
    match name.split(' ').nth(1) {
        Some(token) if !token.is_empty() => token,
        _ => name,
    }
}
