//! SQLite-backed catalog store implementation.

use super::models::{
    Genre, Movie, MovieCredit, MovieQuery, Person, PersonRole, NOT_AVAILABLE,
};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::migrate_if_needed;
use anyhow::{Context, Result};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

const MOVIE_COLUMNS: &str =
    "m.id, m.title, m.year, m.description, m.poster_url, m.rating, m.votes, m.runtime";

/// SQLite-backed movie catalog.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

fn movie_from_row(row: &Row) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        description: row.get(3)?,
        poster_url: row.get(4)?,
        rating: row.get(5)?,
        votes: row.get(6)?,
        runtime: row.get(7)?,
    })
}

fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        migrate_if_needed(&mut write_conn, CATALOG_VERSIONED_SCHEMAS, "catalog")?;

        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on catalog write connection")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let read_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database for reading")?;

        let (movies, genres, persons) = Self::count_rows(&read_conn)?;
        info!(
            "Catalog store ready: {} movies, {} genres, {} persons",
            movies, genres, persons
        );

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn count_rows(conn: &Connection) -> Result<(usize, usize, usize)> {
        let movies: usize = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
        let genres: usize = conn.query_row("SELECT COUNT(*) FROM genres", [], |r| r.get(0))?;
        let persons: usize = conn.query_row("SELECT COUNT(*) FROM persons", [], |r| r.get(0))?;
        Ok((movies, genres, persons))
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn get_movie_by_id(&self, id: i64) -> Result<Option<Movie>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM movies m WHERE m.id = ?1",
            MOVIE_COLUMNS
        ))?;
        Ok(stmt.query_row(params![id], movie_from_row).optional()?)
    }

    fn list_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>> {
        let mut sql = format!("SELECT {} FROM movies m", MOVIE_COLUMNS);
        let mut conditions: Vec<&str> = vec![];
        let mut values: Vec<Value> = vec![];

        if let Some(category) = &query.category {
            conditions.push(
                "EXISTS (SELECT 1 FROM movie_genres mg JOIN genres g ON g.genre_id = mg.genre_id \
                 WHERE mg.movie_id = m.id AND g.name = ?)",
            );
            values.push(Value::Text(category.clone()));
        }
        if let Some(title) = &query.title_contains {
            conditions.push("m.title LIKE ? ESCAPE '\\'");
            values.push(Value::Text(format!("%{}%", escape_like(title))));
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY {} {}, m.id ASC LIMIT ? OFFSET ?",
            query.sort.order_expression(),
            if query.descending { "DESC" } else { "ASC" }
        ));
        values.push(Value::Integer(query.limit as i64));
        values.push(Value::Integer(query.offset as i64));

        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&sql)?;
        let movies = stmt
            .query_map(params_from_iter(values), movie_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    fn update_movie(&self, movie: &Movie) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "UPDATE movies SET description = ?1, poster_url = ?2, rating = ?3, votes = ?4, runtime = ?5
             WHERE id = ?6",
            params![
                movie.description,
                movie.poster_url,
                movie.rating,
                movie.votes,
                movie.runtime,
                movie.id
            ],
        )
        .with_context(|| format!("Failed to update movie {}", movie.id))?;
        Ok(())
    }

    fn update_movie_poster(&self, id: i64, poster_url: &str) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "UPDATE movies SET poster_url = ?1 WHERE id = ?2",
            params![poster_url, id],
        )?;
        Ok(())
    }

    fn insert_movie(&self, movie: &Movie) -> Result<bool> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            "INSERT OR IGNORE INTO movies (id, title, year, description, poster_url, rating, votes, runtime)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                movie.id,
                movie.title,
                movie.year,
                movie.description,
                movie.poster_url,
                movie.rating,
                movie.votes,
                movie.runtime
            ],
        )?;
        Ok(changed > 0)
    }

    fn list_movies_missing_poster(&self, limit: usize) -> Result<Vec<Movie>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {} FROM movies m
             WHERE m.poster_url IS NULL OR m.poster_url = ?1 OR TRIM(m.poster_url) = ''
             ORDER BY m.id LIMIT ?2",
            MOVIE_COLUMNS
        ))?;
        let movies = stmt
            .query_map(params![NOT_AVAILABLE, limit as i64], movie_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(movies)
    }

    fn get_movies_count(&self) -> usize {
        let conn = self.read_conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))
            .unwrap_or(0)
    }

    fn get_genre_by_name(&self, name: &str) -> Result<Option<Genre>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt =
            conn.prepare_cached("SELECT genre_id, name FROM genres WHERE name = ?1")?;
        let genre = stmt
            .query_row(params![name], |row| {
                Ok(Genre {
                    genre_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .optional()?;
        Ok(genre)
    }

    fn insert_genre(&self, name: &str) -> Result<i64> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO genres (name) VALUES (?1)",
            params![name],
        )?;
        // A concurrent repair may have inserted it first, resolve by name.
        let genre_id = conn.query_row(
            "SELECT genre_id FROM genres WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )?;
        Ok(genre_id)
    }

    fn get_movie_genre_link(&self, movie_id: i64, genre_id: i64) -> Result<bool> {
        let conn = self.read_conn.lock().unwrap();
        let exists = conn
            .query_row(
                "SELECT 1 FROM movie_genres WHERE movie_id = ?1 AND genre_id = ?2",
                params![movie_id, genre_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }

    fn insert_movie_genre_link(&self, movie_id: i64, genre_id: i64) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO movie_genres (movie_id, genre_id) VALUES (?1, ?2)",
            params![movie_id, genre_id],
        )?;
        Ok(())
    }

    fn get_genres_by_movie_id(&self, movie_id: i64) -> Result<Vec<Genre>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT g.genre_id, g.name FROM movie_genres mg
             JOIN genres g ON g.genre_id = mg.genre_id
             WHERE mg.movie_id = ?1 ORDER BY mg.rowid",
        )?;
        let genres = stmt
            .query_map(params![movie_id], |row| {
                Ok(Genre {
                    genre_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(genres)
    }

    fn get_person_by_name(&self, name: &str) -> Result<Option<Person>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT person_id, name, photo_url FROM persons WHERE name = ?1
             ORDER BY person_id LIMIT 1",
        )?;
        let person = stmt
            .query_row(params![name], |row| {
                Ok(Person {
                    person_id: row.get(0)?,
                    name: row.get(1)?,
                    photo_url: row.get(2)?,
                })
            })
            .optional()?;
        Ok(person)
    }

    fn insert_person(&self, name: &str, photo_url: Option<&str>) -> Result<i64> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO persons (name, photo_url) VALUES (?1, ?2)",
            params![name, photo_url],
        )?;
        let person_id = conn.query_row(
            "SELECT person_id FROM persons WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )?;
        Ok(person_id)
    }

    fn update_person_photo(&self, person_id: i64, photo_url: &str) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "UPDATE persons SET photo_url = ?1 WHERE person_id = ?2",
            params![photo_url, person_id],
        )?;
        Ok(())
    }

    fn get_movie_person_link(
        &self,
        movie_id: i64,
        person_id: i64,
        role: PersonRole,
    ) -> Result<bool> {
        let conn = self.read_conn.lock().unwrap();
        let exists = conn
            .query_row(
                "SELECT 1 FROM movie_persons WHERE movie_id = ?1 AND person_id = ?2 AND role = ?3",
                params![movie_id, person_id, role.as_str()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(exists)
    }

    fn insert_movie_person_link(
        &self,
        movie_id: i64,
        person_id: i64,
        role: PersonRole,
        position: usize,
    ) -> Result<()> {
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO movie_persons (movie_id, person_id, role, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![movie_id, person_id, role.as_str(), position as i64],
        )?;
        Ok(())
    }

    fn get_people_by_movie_id(&self, movie_id: i64) -> Result<Vec<MovieCredit>> {
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(
            "SELECT p.person_id, p.name, p.photo_url, mp.role FROM movie_persons mp
             JOIN persons p ON p.person_id = mp.person_id
             WHERE mp.movie_id = ?1
             ORDER BY CASE mp.role WHEN 'Director' THEN 0 ELSE 1 END, mp.position, mp.rowid",
        )?;
        let credits = stmt
            .query_map(params![movie_id], |row| {
                let role: String = row.get(3)?;
                let role = role.parse::<PersonRole>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
                })?;
                Ok(MovieCredit {
                    person: Person {
                        person_id: row.get(0)?,
                        name: row.get(1)?,
                        photo_url: row.get(2)?,
                    },
                    role,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(credits)
    }
}
