//! Catalog data models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Poster or photo value used when no image is available anywhere.
pub const NOT_AVAILABLE: &str = "N/A";

/// A movie row as stored in the catalog.
///
/// Field names on the wire are kept compatible with the existing clients
/// (`posterURL`), which is why serde renames are explicit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "posterURL", default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub votes: i64,
    #[serde(default = "default_runtime")]
    pub runtime: String,
}

fn default_runtime() -> String {
    "0 min".to_string()
}

impl Movie {
    /// A movie is complete when it has a description and a usable poster.
    pub fn is_complete(&self) -> bool {
        self.description.is_some() && has_usable_image(self.poster_url.as_deref())
    }
}

/// True when the image url is present, not blank and not the "N/A" sentinel.
pub fn has_usable_image(url: Option<&str>) -> bool {
    matches!(url.map(str::trim), Some(url) if !url.is_empty() && url != NOT_AVAILABLE)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub person_id: i64,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonRole {
    Director,
    Actor,
}

impl PersonRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonRole::Director => "Director",
            PersonRole::Actor => "Actor",
        }
    }
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Director" => Ok(PersonRole::Director),
            "Actor" => Ok(PersonRole::Actor),
            other => anyhow::bail!("Unknown person role: {}", other),
        }
    }
}

/// A person linked to a movie with the role they had in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieCredit {
    pub person: Person,
    pub role: PersonRole,
}

/// Name and photo of a person as exposed in movie details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        PersonSummary {
            name: person.name.clone(),
            photo_url: person.photo_url.clone(),
        }
    }
}

/// A movie together with its genres and credits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    pub genres: Vec<String>,
    pub directors: Vec<PersonSummary>,
    pub actors: Vec<PersonSummary>,
}

impl MovieDetails {
    pub fn without_credits(movie: Movie) -> Self {
        MovieDetails {
            movie,
            genres: vec![],
            directors: vec![],
            actors: vec![],
        }
    }

    /// Builds details from stored genre names and credits, keeping store order.
    pub fn from_stored(movie: Movie, genres: Vec<Genre>, credits: Vec<MovieCredit>) -> Self {
        let mut directors = vec![];
        let mut actors = vec![];
        for credit in &credits {
            let summary = PersonSummary::from(&credit.person);
            match credit.role {
                PersonRole::Director => directors.push(summary),
                PersonRole::Actor => actors.push(summary),
            }
        }
        MovieDetails {
            movie,
            genres: genres.into_iter().map(|g| g.name).collect(),
            directors,
            actors,
        }
    }
}

/// Field a movie listing can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Year,
    Title,
    Rating,
    Votes,
    Runtime,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Year,
        SortField::Title,
        SortField::Rating,
        SortField::Votes,
        SortField::Runtime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Year => "year",
            SortField::Title => "title",
            SortField::Rating => "rating",
            SortField::Votes => "votes",
            SortField::Runtime => "runtime",
        }
    }

    /// SQL expression used in ORDER BY. Runtime is stored as "<n> min" so it
    /// is compared numerically.
    pub(crate) fn order_expression(&self) -> &'static str {
        match self {
            SortField::Year => "m.year",
            SortField::Title => "m.title",
            SortField::Rating => "m.rating",
            SortField::Votes => "m.votes",
            SortField::Runtime => "CAST(m.runtime AS INTEGER)",
        }
    }
}

impl FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .iter()
            .find(|field| field.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unknown sorting field: {}", s))
    }
}

/// Category value meaning "no genre filter".
pub const ALL_CATEGORIES: &str = "all";

/// Parameters of a movie listing.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieQuery {
    pub sort: SortField,
    pub limit: usize,
    pub offset: usize,
    /// Genre name to filter by, `None` for every genre.
    pub category: Option<String>,
    pub descending: bool,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
}

impl Default for MovieQuery {
    fn default() -> Self {
        MovieQuery {
            sort: SortField::Title,
            limit: 10,
            offset: 0,
            category: None,
            descending: false,
            title_contains: None,
        }
    }
}
