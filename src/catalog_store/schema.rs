//! SQLite schema definitions for the movie catalog database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const MOVIE_FK: ForeignKey = ForeignKey {
    foreign_table: "movies",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "genre_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const PERSON_FK: ForeignKey = ForeignKey {
    foreign_table: "persons",
    foreign_column: "person_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const MOVIES_TABLE: Table = Table {
    name: "movies",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Integer),
        sqlite_column!("description", &SqlType::Text),
        // NULL or "N/A" when unknown
        sqlite_column!("poster_url", &SqlType::Text),
        sqlite_column!("rating", &SqlType::Real, non_null = true, default_value = Some("0")),
        sqlite_column!("votes", &SqlType::Integer, non_null = true, default_value = Some("0")),
        sqlite_column!(
            "runtime",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'0 min'")
        ),
    ],
    indices: &[("idx_movies_title", "title")],
    unique_constraints: &[],
};

const GENRES_TABLE: Table = Table {
    name: "genres",
    columns: &[
        sqlite_column!("genre_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    indices: &[],
    unique_constraints: &[],
};

const PERSONS_TABLE: Table = Table {
    name: "persons",
    columns: &[
        sqlite_column!("person_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("photo_url", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[],
};

const MOVIE_GENRES_TABLE: Table = Table {
    name: "movie_genres",
    columns: &[
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!(
            "genre_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&GENRE_FK)
        ),
    ],
    indices: &[("idx_movie_genres_genre", "genre_id")],
    unique_constraints: &[&["movie_id", "genre_id"]],
};

const MOVIE_PERSONS_TABLE: Table = Table {
    name: "movie_persons",
    columns: &[
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!(
            "person_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&PERSON_FK)
        ),
        // "Director" or "Actor"
        sqlite_column!("role", &SqlType::Text, non_null = true),
        // Order of the credit as listed by the metadata provider
        sqlite_column!("position", &SqlType::Integer, non_null = true, default_value = Some("0")),
    ],
    indices: &[("idx_movie_persons_person", "person_id")],
    unique_constraints: &[&["movie_id", "person_id", "role"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        MOVIES_TABLE,
        GENRES_TABLE,
        PERSONS_TABLE,
        MOVIE_GENRES_TABLE,
        MOVIE_PERSONS_TABLE,
    ],
    migration: None,
}];
