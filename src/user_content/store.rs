//! SQLite-backed user content store.

use super::models::Comment;
use super::schema::USER_CONTENT_VERSIONED_SCHEMAS;
use super::trait_def::UserContentStore;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub struct SqliteUserContentStore {
    conn: Arc<Mutex<Connection>>,
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        comment_id: row.get(0)?,
        movie_id: row.get(1)?,
        user_id: row.get(2)?,
        reply_comment_id: row.get(3)?,
        text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl SqliteUserContentStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let mut conn = Connection::open(db_path.as_ref()).context("Failed to open user database")?;
        migrate_if_needed(&mut conn, USER_CONTENT_VERSIONED_SCHEMAS, "user")?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on user database")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let comments: usize = conn.query_row("SELECT COUNT(*) FROM comments", [], |r| r.get(0))?;
        let favorites: usize =
            conn.query_row("SELECT COUNT(*) FROM favorites", [], |r| r.get(0))?;
        info!(
            "User content store ready: {} comments, {} favorites",
            comments, favorites
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl UserContentStore for SqliteUserContentStore {
    fn get_first_order_comments(
        &self,
        movie_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT comment_id, movie_id, user_id, reply_comment_id, text, created FROM comments
             WHERE movie_id = ?1 AND reply_comment_id IS NULL
             ORDER BY comment_id DESC LIMIT ?2 OFFSET ?3",
        )?;
        let comments = stmt
            .query_map(
                params![movie_id, limit as i64, offset as i64],
                comment_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    fn get_second_order_comments(
        &self,
        movie_id: i64,
        comment_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Comment>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT comment_id, movie_id, user_id, reply_comment_id, text, created FROM comments
             WHERE movie_id = ?1 AND reply_comment_id = ?2
             ORDER BY comment_id ASC LIMIT ?3 OFFSET ?4",
        )?;
        let comments = stmt
            .query_map(
                params![movie_id, comment_id, limit as i64, offset as i64],
                comment_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(comments)
    }

    fn post_comment(
        &self,
        user_id: &str,
        movie_id: i64,
        reply_comment_id: Option<i64>,
        text: &str,
    ) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        if let Some(parent_id) = reply_comment_id {
            let parent_is_first_order = conn
                .query_row(
                    "SELECT 1 FROM comments
                     WHERE comment_id = ?1 AND movie_id = ?2 AND reply_comment_id IS NULL",
                    params![parent_id, movie_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !parent_is_first_order {
                return Ok(None);
            }
        }
        conn.execute(
            "INSERT INTO comments (movie_id, user_id, reply_comment_id, text) VALUES (?1, ?2, ?3, ?4)",
            params![movie_id, user_id, reply_comment_id, text],
        )?;
        Ok(Some(conn.last_insert_rowid()))
    }

    fn is_movie_in_favorites(&self, user_id: &str, movie_id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists = conn
            .query_row(
                "SELECT 1 FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
                params![user_id, movie_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }

    fn toggle_favorite(&self, user_id: &str, movie_id: i64) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
            params![user_id, movie_id],
        )?;
        if removed == 0 {
            tx.execute(
                "INSERT INTO favorites (user_id, movie_id) VALUES (?1, ?2)",
                params![user_id, movie_id],
            )?;
        }
        tx.commit()?;
        Ok(removed == 0)
    }

    fn get_favorite_movie_ids(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT movie_id FROM favorites WHERE user_id = ?1
             ORDER BY rowid DESC LIMIT ?2 OFFSET ?3",
        )?;
        let ids = stmt
            .query_map(params![user_id, limit as i64, offset as i64], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }
}
