//! SQLite schema definitions for the user content database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const PARENT_COMMENT_FK: ForeignKey = ForeignKey {
    foreign_table: "comments",
    foreign_column: "comment_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const COMMENTS_TABLE: Table = Table {
    name: "comments",
    columns: &[
        sqlite_column!("comment_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("movie_id", &SqlType::Integer, non_null = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "reply_comment_id",
            &SqlType::Integer,
            foreign_key = Some(&PARENT_COMMENT_FK)
        ),
        sqlite_column!("text", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_comments_movie", "movie_id"),
        ("idx_comments_reply", "reply_comment_id"),
    ],
    unique_constraints: &[],
};

const FAVORITES_TABLE: Table = Table {
    name: "favorites",
    columns: &[
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("movie_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["user_id", "movie_id"]],
};

pub const USER_CONTENT_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[COMMENTS_TABLE, FAVORITES_TABLE],
    migration: None,
}];
